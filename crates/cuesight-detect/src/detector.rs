use std::path::Path;

use cuesight_calib::{CalibrationModel, CalibrationPaths, WorldPoint};
use cuesight_image::{Image, ImageSize};
use serde::Serialize;

use crate::{
    classifier::BallClassifier,
    config::DetectorConfig,
    error::DetectError,
    finder::{DetectedCircle, RegionCircleFinder},
    mapper::{CoordinateMapper, MappedBall, MappedBalls},
    overlay,
    sink::ResultSink,
};

/// The outcome of detecting the balls of one image.
#[derive(Debug)]
pub struct DetectionReport {
    /// Size of the source image.
    pub source_size: ImageSize,
    /// The preprocessed image the balls were found in.
    pub processed: Image<u8, 3>,
    /// The circles inside the search region, in detection order.
    pub circles: Vec<DetectedCircle>,
    /// The cue ball, if any.
    pub cue_ball: Option<MappedBall>,
    /// The object balls, in detection order.
    pub object_balls: Vec<MappedBall>,
    /// Number of circles that passed the cue ball color test.
    pub cue_candidates: usize,
}

impl DetectionReport {
    /// Whether no ball was found inside the region.
    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// The table-plane position of the cue ball, if found and projectable.
    pub fn cue_ball_world(&self) -> Option<WorldPoint> {
        self.cue_ball.as_ref().and_then(|b| b.world.as_ref().ok().copied())
    }

    /// The table-plane positions of the projectable object balls.
    pub fn object_balls_world(&self) -> Vec<WorldPoint> {
        self.object_balls
            .iter()
            .filter_map(|b| b.world.as_ref().ok().copied())
            .collect()
    }

    /// Number of object balls with a table-plane position.
    pub fn object_ball_count(&self) -> usize {
        self.object_balls.iter().filter(|b| b.world.is_ok()).count()
    }

    /// A human readable summary of the detections.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} balls in the region ({} object balls)",
            self.circles.len(),
            self.object_ball_count()
        )];

        match &self.cue_ball {
            Some(ball) => lines.push(format!("cue ball: {}", describe(ball))),
            None => lines.push("cue ball: not detected".to_string()),
        }
        if self.cue_candidates > 1 {
            lines.push(format!(
                "warning: {} circles looked like the cue ball",
                self.cue_candidates
            ));
        }

        if self.object_balls.is_empty() {
            lines.push("object balls: none detected".to_string());
        } else {
            lines.push("object balls:".to_string());
            for ball in &self.object_balls {
                lines.push(format!("  {}", describe(ball)));
            }
        }

        lines.join("\n")
    }

    /// A serializable copy of the report, without the image.
    pub fn to_record(&self) -> DetectionRecord {
        DetectionRecord {
            image_size: [self.source_size.width, self.source_size.height],
            processed_size: [self.processed.width(), self.processed.height()],
            cue_ball: self.cue_ball.as_ref().map(BallRecord::from),
            object_balls: self.object_balls.iter().map(BallRecord::from).collect(),
            object_ball_count: self.object_ball_count(),
            cue_candidates: self.cue_candidates,
        }
    }
}

fn describe(ball: &MappedBall) -> String {
    match &ball.world {
        Ok(p) => format!(
            "pixel ({:.1}, {:.1}) -> world ({:.6}, {:.6})",
            ball.pixel.0, ball.pixel.1, p.x, p.y
        ),
        Err(e) => format!("pixel ({:.1}, {:.1}) -> {e}", ball.pixel.0, ball.pixel.1),
    }
}

/// A ball of a [`DetectionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallRecord {
    /// The circle in processed image pixels.
    pub circle: DetectedCircle,
    /// The center in source image pixels.
    pub pixel: [f64; 2],
    /// The center on the table plane.
    pub world: Option<WorldPoint>,
    /// Why the center could not be projected.
    pub error: Option<String>,
}

impl From<&MappedBall> for BallRecord {
    fn from(ball: &MappedBall) -> Self {
        Self {
            circle: ball.circle,
            pixel: [ball.pixel.0, ball.pixel.1],
            world: ball.world.as_ref().ok().copied(),
            error: ball.world.as_ref().err().map(|e| e.to_string()),
        }
    }
}

/// The serializable form of a [`DetectionReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
    /// Width and height of the source image.
    pub image_size: [usize; 2],
    /// Width and height of the processed image.
    pub processed_size: [usize; 2],
    /// The cue ball, if any.
    pub cue_ball: Option<BallRecord>,
    /// The object balls.
    pub object_balls: Vec<BallRecord>,
    /// Number of object balls with a table-plane position.
    pub object_ball_count: usize,
    /// Number of circles that passed the cue ball color test.
    pub cue_candidates: usize,
}

impl DetectionRecord {
    /// Serialize the record as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, DetectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Locates the billiard balls of an image on the table plane.
///
/// The detector owns the calibration model and can process any number of images one after
/// the other; no state is kept between calls.
#[derive(Debug, Clone)]
pub struct BallDetector {
    config: DetectorConfig,
    finder: RegionCircleFinder,
    classifier: BallClassifier,
    model: CalibrationModel,
}

impl BallDetector {
    /// Create a detector from a configuration and a calibration model.
    pub fn new(config: DetectorConfig, model: CalibrationModel) -> Result<Self, DetectError> {
        config.validate()?;
        Ok(Self {
            finder: RegionCircleFinder::new(&config),
            classifier: BallClassifier::new(config.classifier.clone()),
            config,
            model,
        })
    }

    /// Create a detector, reading the calibration matrices from files.
    pub fn from_files(
        config: DetectorConfig,
        paths: &CalibrationPaths,
    ) -> Result<Self, DetectError> {
        let model = CalibrationModel::from_files(paths)?;
        Self::new(config, model)
    }

    /// The detector configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// The calibration model.
    pub fn model(&self) -> &CalibrationModel {
        &self.model
    }

    /// Detect, classify and localize the balls of a source image.
    ///
    /// An image without any ball in the region gives an empty report, not an error.
    pub fn process(&self, image: &Image<u8, 3>) -> Result<DetectionReport, DetectError> {
        let detections = self.finder.find(image)?;

        if detections.circles.is_empty() {
            log::warn!(
                "no ball inside the region ({} circles found in the image)",
                detections.all_circles.len()
            );
        }

        let balls = self.classifier.classify(&detections.processed, &detections.circles);
        if balls.cue_candidates > 1 {
            log::warn!(
                "{} cue ball candidates, keeping the first one",
                balls.cue_candidates
            );
        }

        let MappedBalls {
            cue_ball,
            object_balls,
        } = CoordinateMapper::new(&self.model).map_all(&balls);

        let report = DetectionReport {
            source_size: image.size(),
            processed: detections.processed,
            circles: detections.circles,
            cue_ball,
            object_balls,
            cue_candidates: balls.cue_candidates,
        };

        log::info!(
            "detected {} balls, cue ball {}, {} object balls",
            report.circles.len(),
            if report.cue_ball.is_some() {
                "found"
            } else {
                "missing"
            },
            report.object_ball_count()
        );

        Ok(report)
    }

    /// Read an image file and process it.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<DetectionReport, DetectError> {
        let image = cuesight_io::functional::read_image_any_rgb8(path)?;
        self.process(&image)
    }

    /// Process an image file and hand the results and the overlay to a sink.
    pub fn run(
        &self,
        path: impl AsRef<Path>,
        sink: &mut dyn ResultSink,
    ) -> Result<DetectionReport, DetectError> {
        let report = self.process_file(path)?;
        sink.save(report.cue_ball.as_ref(), &report.object_balls)?;
        sink.display(&overlay::render_overlay(&report))?;
        Ok(report)
    }
}
