use cuesight_image::Image;
use cuesight_imgproc::draw;

use crate::{detector::DetectionReport, finder::DetectedCircle};

/// Outline color of the balls.
pub const BALL_COLOR: [u8; 3] = [0, 0, 255];

/// Outline color of the cue ball.
pub const CUE_BALL_COLOR: [u8; 3] = [255, 0, 0];

/// Outline thickness in pixels.
pub const THICKNESS: usize = 2;

fn outline(img: &mut Image<u8, 3>, circle: &DetectedCircle, color: [u8; 3]) {
    draw::draw_circle(
        img,
        (circle.x as i64, circle.y as i64),
        circle.radius as i64,
        color,
        THICKNESS,
    );
}

/// Draw the detections on a copy of the processed image.
///
/// Every circle inside the region is outlined in blue and the cue ball is outlined again in
/// red on top.
pub fn render_overlay(report: &DetectionReport) -> Image<u8, 3> {
    let mut img = report.processed.clone();

    for circle in &report.circles {
        outline(&mut img, circle, BALL_COLOR);
    }

    if let Some(cue_ball) = &report.cue_ball {
        outline(&mut img, &cue_ball.circle, CUE_BALL_COLOR);
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::MappedBall;
    use cuesight_calib::WorldPoint;
    use cuesight_image::{ImageError, ImageSize};

    fn circle(x: i32, y: i32) -> DetectedCircle {
        DetectedCircle {
            x,
            y,
            radius: 10,
            scale: 1.0,
        }
    }

    fn mapped(circle: DetectedCircle) -> MappedBall {
        MappedBall {
            circle,
            pixel: (circle.x as f64, circle.y as f64),
            world: Ok(WorldPoint {
                x: circle.x as f64,
                y: circle.y as f64,
            }),
        }
    }

    #[test]
    fn cue_ball_is_red_and_others_blue() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 80,
            height: 40,
        };
        let report = DetectionReport {
            source_size: size,
            processed: Image::from_size_val(size, 0)?,
            circles: vec![circle(20, 20), circle(60, 20)],
            cue_ball: Some(mapped(circle(20, 20))),
            object_balls: vec![mapped(circle(60, 20))],
            cue_candidates: 1,
        };

        let img = render_overlay(&report);

        assert_eq!(img.pixel(30, 20), Some(&CUE_BALL_COLOR[..]));
        assert_eq!(img.pixel(70, 20), Some(&BALL_COLOR[..]));
        assert_eq!(img.pixel(60, 20), Some(&[0u8, 0, 0][..]));
        // the processed image is left untouched
        assert!(report.processed.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }
}
