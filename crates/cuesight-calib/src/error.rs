use std::path::PathBuf;

/// An error type for the calibration module.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum CalibrationError {
    /// Error to open or read a matrix file.
    #[error("Failed to read the matrix file {0}. {1}")]
    FileError(PathBuf, #[source] std::io::Error),

    /// A value of a matrix file is not a number.
    #[error("Invalid value {value:?} in {path} at line {line}")]
    ParseValue {
        /// The file being parsed.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// The offending text.
        value: String,
    },

    /// A row of a matrix file does not have the same number of values as the first one.
    #[error("Row at line {line} of {path} has {found} values, expected {expected}")]
    RaggedRow {
        /// The file being parsed.
        path: PathBuf,
        /// The 1-based line number.
        line: usize,
        /// The number of values of the first row.
        expected: usize,
        /// The number of values found.
        found: usize,
    },

    /// A matrix file has no values.
    #[error("The matrix file {0} is empty")]
    EmptyGrid(PathBuf),

    /// A matrix does not have the expected shape.
    #[error("Invalid shape for the {name} matrix: got {rows}x{cols}, expected {expected}")]
    InvalidShape {
        /// The matrix name.
        name: &'static str,
        /// The expected shape.
        expected: &'static str,
        /// The number of rows found.
        rows: usize,
        /// The number of columns found.
        cols: usize,
    },

    /// A matrix holds a NaN or infinite value.
    #[error("Non-finite value {value} in the {name} matrix at ({row}, {col})")]
    NonFinite {
        /// The matrix name.
        name: &'static str,
        /// The row of the value.
        row: usize,
        /// The column of the value.
        col: usize,
        /// The value.
        value: f64,
    },

    /// A matrix file parsed but holds a matrix of the wrong shape or a non-finite value.
    #[error("Malformed matrix file {0}. {1}")]
    MalformedFile(PathBuf, #[source] Box<CalibrationError>),

    /// The projection matrix cannot be inverted.
    #[error("The projection matrix is singular (determinant {det:e})")]
    SingularProjection {
        /// The determinant of the projection matrix.
        det: f64,
    },

    /// The homogeneous scale of a projected point vanishes.
    #[error("Degenerate homogeneous scale w={w:e} when projecting ({u}, {v})")]
    DegenerateScale {
        /// First coordinate of the input point.
        u: f64,
        /// Second coordinate of the input point.
        v: f64,
        /// The homogeneous scale.
        w: f64,
    },
}
