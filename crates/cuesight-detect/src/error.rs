use std::path::PathBuf;

use cuesight_calib::CalibrationError;
use cuesight_image::ImageError;
use cuesight_io::IoError;

/// An error type for the detection pipeline.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum DetectError {
    /// The detector configuration is not usable.
    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),

    /// Error from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error to read or write an image file.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Error to load the calibration or to project a point.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Error to read a configuration file or write a result file.
    #[error("Failed to manipulate the file {0}. {1}")]
    FileError(PathBuf, #[source] std::io::Error),

    /// Error to parse or serialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
