use cuesight_image::Image;
use serde::{Deserialize, Serialize};

use crate::{config::ClassifierConfig, finder::DetectedCircle};

/// The circles split into the cue ball and the object balls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassifiedBalls {
    /// The cue ball, if a circle passed the color test.
    pub cue_ball: Option<DetectedCircle>,
    /// The other circles, in their original order.
    pub object_balls: Vec<DetectedCircle>,
    /// Number of circles that passed the color test. Above one the choice was ambiguous.
    pub cue_candidates: usize,
}

/// Tells the cue ball apart from the object balls by its white surface.
#[derive(Debug, Clone, Default)]
pub struct BallClassifier {
    config: ClassifierConfig,
}

impl BallClassifier {
    /// Create a classifier.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Whether the circle has the color signature of the cue ball.
    ///
    /// For every offset `h` the four diagonal samples `(x ± h, y ± h)` must lie inside the
    /// image and have all channels above the white threshold.
    pub fn is_cue_ball(&self, image: &Image<u8, 3>, circle: &DetectedCircle) -> bool {
        let threshold = self.config.white_threshold;
        let (x, y) = (circle.x as i64, circle.y as i64);

        (self.config.min_offset..=self.config.max_offset).all(|h| {
            let h = h as i64;
            [(h, h), (-h, -h), (-h, h), (h, -h)]
                .iter()
                .all(|&(dx, dy)| {
                    let (sx, sy) = (x + dx, y + dy);
                    if sx < 0 || sy < 0 {
                        return false;
                    }
                    image
                        .pixel(sx as usize, sy as usize)
                        .is_some_and(|p| p.iter().all(|&v| v > threshold))
                })
        })
    }

    /// Split the circles into the cue ball and the object balls.
    ///
    /// The first circle passing the color test is the cue ball. Later ones stay object balls
    /// and are reported through [`ClassifiedBalls::cue_candidates`].
    pub fn classify(&self, image: &Image<u8, 3>, circles: &[DetectedCircle]) -> ClassifiedBalls {
        let mut balls = ClassifiedBalls::default();

        for circle in circles {
            if !self.is_cue_ball(image, circle) {
                balls.object_balls.push(*circle);
                continue;
            }

            balls.cue_candidates += 1;
            if balls.cue_ball.is_none() {
                balls.cue_ball = Some(*circle);
            } else {
                log::warn!(
                    "extra cue ball candidate at ({}, {}) kept as an object ball",
                    circle.x,
                    circle.y
                );
                balls.object_balls.push(*circle);
            }
        }

        balls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesight_image::ImageError;
    use cuesight_imgproc::draw;

    fn circle(x: i32, y: i32) -> DetectedCircle {
        DetectedCircle {
            x,
            y,
            radius: 14,
            scale: 0.5,
        }
    }

    fn table() -> Result<Image<u8, 3>, ImageError> {
        let mut img = Image::<u8, 3>::from_size_val([200, 100].into(), 80)?;
        draw::draw_filled_circle(&mut img, (40, 50), 14, [255, 255, 255]);
        draw::draw_filled_circle(&mut img, (100, 50), 14, [255, 200, 80]);
        draw::draw_filled_circle(&mut img, (160, 50), 14, [255, 255, 255]);
        Ok(img)
    }

    #[test]
    fn white_disk_is_cue_ball() -> Result<(), ImageError> {
        let img = table()?;
        let classifier = BallClassifier::default();
        assert!(classifier.is_cue_ball(&img, &circle(40, 50)));
        assert!(!classifier.is_cue_ball(&img, &circle(100, 50)));
        Ok(())
    }

    #[test]
    fn one_dark_sample_disqualifies() -> Result<(), ImageError> {
        let mut img = table()?;
        // a single sample at offset 7 along the (-h, +h) diagonal
        if let Some(p) = img.pixel_mut(33, 57) {
            p.copy_from_slice(&[255, 255, 253]);
        }
        let classifier = BallClassifier::default();
        assert!(!classifier.is_cue_ball(&img, &circle(40, 50)));
        Ok(())
    }

    #[test]
    fn samples_outside_the_image_disqualify() -> Result<(), ImageError> {
        let img = Image::<u8, 3>::from_size_val([20, 20].into(), 255)?;
        let classifier = BallClassifier::default();
        assert!(classifier.is_cue_ball(&img, &circle(10, 10)));
        assert!(!classifier.is_cue_ball(&img, &circle(4, 10)));
        assert!(!classifier.is_cue_ball(&img, &circle(10, 15)));
        Ok(())
    }

    #[test]
    fn first_candidate_wins() -> Result<(), ImageError> {
        let img = table()?;
        let circles = [circle(100, 50), circle(160, 50), circle(40, 50)];

        let balls = BallClassifier::default().classify(&img, &circles);

        assert_eq!(balls.cue_ball, Some(circle(160, 50)));
        assert_eq!(balls.object_balls, vec![circle(100, 50), circle(40, 50)]);
        assert_eq!(balls.cue_candidates, 2);
        Ok(())
    }

    #[test]
    fn no_cue_ball() -> Result<(), ImageError> {
        let img = table()?;
        let balls = BallClassifier::default().classify(&img, &[circle(100, 50)]);
        assert_eq!(balls.cue_ball, None);
        assert_eq!(balls.object_balls.len(), 1);
        assert_eq!(balls.cue_candidates, 0);

        let balls = BallClassifier::default().classify(&img, &[]);
        assert_eq!(balls, ClassifiedBalls::default());
        Ok(())
    }
}
