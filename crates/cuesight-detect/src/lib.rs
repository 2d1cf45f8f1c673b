#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// ball classification by color signature.
pub mod classifier;

/// detector and output configuration.
pub mod config;

/// end-to-end detection pipeline.
pub mod detector;

/// Error types for the detection module.
pub mod error;

/// circle detection inside the table region.
pub mod finder;

/// pixel to table-plane mapping of the classified balls.
pub mod mapper;

/// overlay rendering of the detections.
pub mod overlay;

/// persistence and display of the detection results.
pub mod sink;

pub use crate::classifier::{BallClassifier, ClassifiedBalls};
pub use crate::config::{
    ClassifierConfig, DetectorConfig, OutputConfig, PreprocessConfig, RegionConfig,
};
pub use crate::detector::{BallDetector, BallRecord, DetectionRecord, DetectionReport};
pub use crate::error::DetectError;
pub use crate::finder::{CircleDetections, DetectedCircle, RegionCircleFinder};
pub use crate::mapper::{CoordinateMapper, MappedBall, MappedBalls};
pub use crate::overlay::render_overlay;
pub use crate::sink::{CsvResultSink, ResultSink};
