use cuesight_calib::{CalibrationError, CalibrationModel, WorldPoint};

use crate::{classifier::ClassifiedBalls, finder::DetectedCircle};

/// A classified circle with its position in source pixels and on the table plane.
#[derive(Debug)]
pub struct MappedBall {
    /// The circle in processed image pixels.
    pub circle: DetectedCircle,
    /// The center in source image pixels.
    pub pixel: (f64, f64),
    /// The center on the table plane, or why it could not be projected.
    pub world: Result<WorldPoint, CalibrationError>,
}

/// The classified balls mapped to the table plane.
#[derive(Debug, Default)]
pub struct MappedBalls {
    /// The cue ball, if any.
    pub cue_ball: Option<MappedBall>,
    /// The object balls, in classification order.
    pub object_balls: Vec<MappedBall>,
}

/// Projects ball centers from the processed image to the table plane.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper<'a> {
    model: &'a CalibrationModel,
}

impl<'a> CoordinateMapper<'a> {
    /// Create a mapper that borrows the calibration model.
    pub fn new(model: &'a CalibrationModel) -> Self {
        Self { model }
    }

    /// Map one circle, rescaling its center to source pixels first.
    pub fn map(&self, circle: &DetectedCircle) -> MappedBall {
        let (u, v) = circle.source_center();
        let world = self.model.pixel_to_world(u, v);
        if let Err(e) = &world {
            log::warn!("cannot map ball at ({u}, {v}): {e}");
        }
        MappedBall {
            circle: *circle,
            pixel: (u, v),
            world,
        }
    }

    /// Map the cue ball and every object ball independently.
    pub fn map_all(&self, balls: &ClassifiedBalls) -> MappedBalls {
        MappedBalls {
            cue_ball: balls.cue_ball.as_ref().map(|c| self.map(c)),
            object_balls: balls.object_balls.iter().map(|c| self.map(c)).collect(),
        }
    }
}
