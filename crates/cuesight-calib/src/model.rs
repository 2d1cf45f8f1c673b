use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{error::CalibrationError, grid::MatrixGrid};

/// Relative tolerance on the determinant of the projection, scaled by its Frobenius norm cubed.
const SINGULAR_EPS: f64 = 1e-12;

/// Relative tolerance on the homogeneous scale, scaled by the magnitude of its terms.
const SCALE_EPS: f64 = 1e-12;

/// The files holding the calibration matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationPaths {
    /// Comma-delimited 3x3 intrinsic matrix.
    pub intrinsic: PathBuf,
    /// Comma-delimited rotation matrix, at least 3x3.
    pub rotation: PathBuf,
    /// Comma-delimited 3x1 translation vector.
    pub translation: PathBuf,
}

impl CalibrationPaths {
    /// The file holding the matrix of the given name.
    fn path_of(&self, name: &str) -> Option<&Path> {
        match name {
            "intrinsic" => Some(&self.intrinsic),
            "rotation" => Some(&self.rotation),
            "translation" => Some(&self.translation),
            _ => None,
        }
    }
}

/// A point on the table plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// First planar coordinate.
    pub x: f64,
    /// Second planar coordinate.
    pub y: f64,
}

/// The intrinsic and extrinsic calibration of the table camera.
///
/// # Fields
///
/// * `intrinsic` - The camera matrix K, 3x3.
/// * `rotation` - The first three rows and columns of the rotation matrix R.
/// * `translation` - The translation vector t, 3x1.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationMatrices {
    /// The camera matrix K.
    pub intrinsic: [[f64; 3]; 3],
    /// The rotation matrix R.
    pub rotation: [[f64; 3]; 3],
    /// The translation vector t.
    pub translation: [f64; 3],
}

impl CalibrationMatrices {
    /// Build the calibration from parsed matrix grids.
    ///
    /// The intrinsic must be 3x3, the rotation at least 3x3 and the translation 3x1. Only the
    /// top-left 3x3 block of a larger rotation is kept. Every kept value must be finite.
    pub fn from_grids(
        intrinsic: &MatrixGrid,
        rotation: &MatrixGrid,
        translation: &MatrixGrid,
    ) -> Result<Self, CalibrationError> {
        check_shape("intrinsic", "3x3", intrinsic, |r, c| r == 3 && c == 3)?;
        check_shape("rotation", "at least 3x3", rotation, |r, c| r >= 3 && c >= 3)?;
        check_shape("translation", "3x1", translation, |r, c| r == 3 && c == 1)?;

        let intrinsic = block3x3("intrinsic", intrinsic)?;
        let rotation = block3x3("rotation", rotation)?;

        let mut t = [0.0; 3];
        for (row, value) in t.iter_mut().enumerate() {
            *value = finite_at("translation", translation, row, 0)?;
        }

        Ok(Self {
            intrinsic,
            rotation,
            translation: t,
        })
    }

    /// Read the three matrix files and build the calibration.
    ///
    /// Shape and finiteness errors are wrapped in [`CalibrationError::MalformedFile`] with the
    /// path of the offending file.
    pub fn from_files(paths: &CalibrationPaths) -> Result<Self, CalibrationError> {
        let intrinsic = MatrixGrid::read(&paths.intrinsic)?;
        let rotation = MatrixGrid::read(&paths.rotation)?;
        let translation = MatrixGrid::read(&paths.translation)?;
        Self::from_grids(&intrinsic, &rotation, &translation).map_err(|e| {
            let path = match &e {
                CalibrationError::InvalidShape { name, .. }
                | CalibrationError::NonFinite { name, .. } => paths.path_of(name),
                _ => None,
            };
            match path {
                Some(path) => CalibrationError::MalformedFile(path.to_path_buf(), Box::new(e)),
                None => e,
            }
        })
    }

    /// The projection from the table plane to the image, `K * [r1 | r2 | t]`, row-major.
    #[rustfmt::skip]
    pub fn projection(&self) -> [f64; 9] {
        let k = &self.intrinsic;
        let r = &self.rotation;
        let t = &self.translation;

        // columns of the plane-to-camera transform
        let m = [
            [r[0][0], r[0][1], t[0]],
            [r[1][0], r[1][1], t[1]],
            [r[2][0], r[2][1], t[2]],
        ];

        let mut h = [0.0; 9];
        for i in 0..3 {
            for j in 0..3 {
                h[i * 3 + j] = k[i][0] * m[0][j] + k[i][1] * m[1][j] + k[i][2] * m[2][j];
            }
        }
        h
    }
}

fn check_shape(
    name: &'static str,
    expected: &'static str,
    grid: &MatrixGrid,
    accept: impl Fn(usize, usize) -> bool,
) -> Result<(), CalibrationError> {
    if accept(grid.rows(), grid.cols()) {
        Ok(())
    } else {
        Err(CalibrationError::InvalidShape {
            name,
            expected,
            rows: grid.rows(),
            cols: grid.cols(),
        })
    }
}

fn finite_at(
    name: &'static str,
    grid: &MatrixGrid,
    row: usize,
    col: usize,
) -> Result<f64, CalibrationError> {
    let value = grid
        .get(row, col)
        .ok_or(CalibrationError::InvalidShape {
            name,
            expected: "at least 3x3",
            rows: grid.rows(),
            cols: grid.cols(),
        })?;

    if !value.is_finite() {
        return Err(CalibrationError::NonFinite {
            name,
            row,
            col,
            value,
        });
    }
    Ok(value)
}

fn block3x3(name: &'static str, grid: &MatrixGrid) -> Result<[[f64; 3]; 3], CalibrationError> {
    let mut m = [[0.0; 3]; 3];
    for (row, values) in m.iter_mut().enumerate() {
        for (col, value) in values.iter_mut().enumerate() {
            *value = finite_at(name, grid, row, col)?;
        }
    }
    Ok(m)
}

#[rustfmt::skip]
fn determinant3x3(m: &[f64; 9]) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f64; 9]) -> [f64; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

fn inverse3x3(m: &[f64; 9]) -> Result<[f64; 9], CalibrationError> {
    let det = determinant3x3(m);
    let norm = m.iter().map(|v| v * v).sum::<f64>().sqrt();

    if !det.is_finite() || det.abs() <= SINGULAR_EPS * norm.powi(3) {
        return Err(CalibrationError::SingularProjection { det });
    }

    let adj = adjugate3x3(m);
    let inv_det = 1.0 / det;

    let mut inv_m = [0.0; 9];
    for (inv, a) in inv_m.iter_mut().zip(adj.iter()) {
        *inv = a * inv_det;
    }

    Ok(inv_m)
}

/// Apply a row-major 3x3 homography to `(u, v, 1)` and dehomogenize.
fn transform_point(u: f64, v: f64, m: &[f64; 9]) -> Result<(f64, f64), CalibrationError> {
    let (wu, wv, wc) = (m[6] * u, m[7] * v, m[8]);
    let w = wu + wv + wc;

    let magnitude = wu.abs() + wv.abs() + wc.abs();
    if !w.is_finite() || w.abs() <= SCALE_EPS * magnitude || w == 0.0 {
        return Err(CalibrationError::DegenerateScale { u, v, w });
    }

    let x = (m[0] * u + m[1] * v + m[2]) / w;
    let y = (m[3] * u + m[4] * v + m[5]) / w;
    Ok((x, y))
}

/// The table-plane projection of a calibrated camera and its inverse.
///
/// The model is immutable once built and can be shared by reference between detections.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationModel {
    projection: [f64; 9],
    inverse: [f64; 9],
}

impl CalibrationModel {
    /// Build the projection `H = K * [r1 | r2 | t]` and its inverse.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::SingularProjection`] if `H` is not invertible.
    ///
    /// # Example
    ///
    /// ```
    /// use cuesight_calib::{CalibrationMatrices, CalibrationModel};
    ///
    /// let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    /// let matrices = CalibrationMatrices {
    ///     intrinsic: identity,
    ///     rotation: identity,
    ///     translation: [0.0, 0.0, 1.0],
    /// };
    /// let model = CalibrationModel::new(matrices).unwrap();
    /// let p = model.pixel_to_world(200.0, 150.0).unwrap();
    /// assert_eq!((p.x, p.y), (200.0, 150.0));
    /// ```
    pub fn new(matrices: CalibrationMatrices) -> Result<Self, CalibrationError> {
        let projection = matrices.projection();
        let inverse = inverse3x3(&projection)?;

        log::debug!("projection: {projection:?}");
        log::debug!("inverse projection: {inverse:?}");

        Ok(Self {
            projection,
            inverse,
        })
    }

    /// Read the calibration matrix files and build the model.
    pub fn from_files(paths: &CalibrationPaths) -> Result<Self, CalibrationError> {
        Self::new(CalibrationMatrices::from_files(paths)?)
    }

    /// The table-plane to image projection `H`, row-major.
    pub fn projection(&self) -> &[f64; 9] {
        &self.projection
    }

    /// The image to table-plane projection `H^-1`, row-major.
    pub fn inverse_projection(&self) -> &[f64; 9] {
        &self.inverse
    }

    /// Map an image pixel of the source image to the table plane.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::DegenerateScale`] when the pixel lies on the vanishing line
    /// of the table plane.
    pub fn pixel_to_world(&self, u: f64, v: f64) -> Result<WorldPoint, CalibrationError> {
        let (x, y) = transform_point(u, v, &self.inverse)?;
        Ok(WorldPoint { x, y })
    }

    /// Map a point of the table plane to source image pixels.
    pub fn world_to_pixel(&self, point: WorldPoint) -> Result<(f64, f64), CalibrationError> {
        transform_point(point.x, point.y, &self.projection)
    }
}
