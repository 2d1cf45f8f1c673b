#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the calibration module.
pub mod error;

/// Reading of comma-delimited numeric matrix files.
pub mod grid;

/// Calibration matrices and the pixel to table-plane projection.
pub mod model;

pub use crate::error::CalibrationError;
pub use crate::grid::MatrixGrid;
pub use crate::model::{CalibrationMatrices, CalibrationModel, CalibrationPaths, WorldPoint};
