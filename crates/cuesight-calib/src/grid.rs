use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::error::CalibrationError;

/// A dense row-major matrix of `f64` read from a delimited text file.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl MatrixGrid {
    /// Create a grid from row-major data.
    ///
    /// Returns `None` if the data length does not match `rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    /// Create a grid from a list of rows of equal length.
    ///
    /// Returns `None` if the rows are ragged.
    pub fn from_rows<const N: usize>(rows: &[[f64; N]]) -> Option<Self> {
        let data = rows.iter().flatten().copied().collect();
        Self::new(rows.len(), N, data)
    }

    /// The number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The value at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// The row-major values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Parse a grid from lines of comma-delimited values.
    ///
    /// Blank lines are skipped and surrounding whitespace is trimmed. `source` is only used to
    /// name the input in errors.
    pub fn parse<I, S>(lines: I, source: &Path) -> Result<Self, CalibrationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut data = Vec::new();
        let mut cols = None;
        let mut rows = 0;

        for (line_idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            let row = line
                .split(',')
                .map(|part| parse_value(part, line_idx + 1, source))
                .collect::<Result<Vec<_>, _>>()?;

            match cols {
                None => cols = Some(row.len()),
                Some(expected) if expected != row.len() => {
                    return Err(CalibrationError::RaggedRow {
                        path: source.to_owned(),
                        line: line_idx + 1,
                        expected,
                        found: row.len(),
                    });
                }
                Some(_) => {}
            }

            data.extend(row);
            rows += 1;
        }

        match cols {
            Some(cols) => Ok(Self { rows, cols, data }),
            None => Err(CalibrationError::EmptyGrid(source.to_owned())),
        }
    }

    /// Read a grid from a comma-delimited text file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the matrix file.
    ///
    /// # Returns
    ///
    /// The parsed grid.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let path = path.as_ref();

        let file =
            File::open(path).map_err(|e| CalibrationError::FileError(path.to_owned(), e))?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CalibrationError::FileError(path.to_owned(), e))?;

        let grid = Self::parse(&lines, path)?;
        log::debug!(
            "read {}x{} matrix from {}",
            grid.rows,
            grid.cols,
            path.display()
        );
        Ok(grid)
    }
}

fn parse_value(part: &str, line: usize, source: &Path) -> Result<f64, CalibrationError> {
    let part = part.trim();
    part.parse::<f64>()
        .map_err(|_| CalibrationError::ParseValue {
            path: source.to_owned(),
            line,
            value: part.to_string(),
        })
}
