//! Circle detection with the gradient Hough transform.
//!
//! Every Canny edge pixel casts votes along its gradient direction, in both senses, at each
//! distance in `[min_radius, max_radius]`. Disk boundaries make their gradient lines meet at
//! the disk center, so centers show up as local maxima of the accumulator. Each accepted
//! center then gets the radius best supported by the distances to the edge pixels.

use cuesight_image::{Image, ImageError};
use serde::{Deserialize, Serialize};

use crate::edges;

/// Configuration for the gradient Hough circle detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughCirclesConfig {
    /// Inverse ratio of the accumulator resolution to the image resolution.
    pub dp: f32,
    /// Minimum distance between detected centers (pixels).
    pub min_dist: f32,
    /// Upper Canny threshold. The lower one is half of it.
    pub canny_threshold: f32,
    /// Minimum number of votes for a center, and of edge pixels supporting its radius.
    pub accumulator_threshold: u32,
    /// Minimum circle radius (pixels).
    pub min_radius: u32,
    /// Maximum circle radius (pixels).
    pub max_radius: u32,
}

impl Default for HoughCirclesConfig {
    fn default() -> Self {
        Self {
            dp: 1.0,
            min_dist: 20.0,
            canny_threshold: 100.0,
            accumulator_threshold: 15,
            min_radius: 10,
            max_radius: 18,
        }
    }
}

impl HoughCirclesConfig {
    /// Check that the parameters describe a usable detector.
    pub fn validate(&self) -> Result<(), ImageError> {
        if !self.dp.is_finite() || self.dp < 1.0 {
            return Err(ImageError::InvalidParameter("dp", self.dp.to_string()));
        }
        if !self.min_dist.is_finite() || self.min_dist <= 0.0 {
            return Err(ImageError::InvalidParameter(
                "min_dist",
                self.min_dist.to_string(),
            ));
        }
        if !self.canny_threshold.is_finite() || self.canny_threshold <= 0.0 {
            return Err(ImageError::InvalidParameter(
                "canny_threshold",
                self.canny_threshold.to_string(),
            ));
        }
        if self.accumulator_threshold == 0 {
            return Err(ImageError::InvalidParameter(
                "accumulator_threshold",
                "must be positive".to_string(),
            ));
        }
        if self.max_radius == 0 || self.min_radius > self.max_radius {
            return Err(ImageError::InvalidParameter(
                "radius range",
                format!("[{}, {}]", self.min_radius, self.max_radius),
            ));
        }
        Ok(())
    }
}

/// A circle found by [`hough_circles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoughCircle {
    /// Center column (pixels).
    pub x: i32,
    /// Center row (pixels).
    pub y: i32,
    /// Radius (pixels).
    pub radius: i32,
    /// Accumulator votes of the center.
    pub votes: u32,
}

/// An accumulator cell that is a local maximum above the vote threshold.
struct CenterCandidate {
    ax: usize,
    ay: usize,
    votes: u32,
}

/// Cast the center votes of every edge pixel into the accumulator.
fn accumulate_votes(
    edge_points: &[(usize, usize, f32, f32)],
    config: &HoughCirclesConfig,
    acc_cols: usize,
    acc_rows: usize,
) -> Vec<u32> {
    let mut acc = vec![0u32; acc_cols * acc_rows];
    let inv_dp = 1.0 / config.dp;

    for &(x, y, ux, uy) in edge_points {
        for sign in [1.0f32, -1.0] {
            let mut last_cell = None;
            for r in config.min_radius..=config.max_radius {
                let r = r as f32 * sign;
                let cx = ((x as f32 + ux * r) * inv_dp).round();
                let cy = ((y as f32 + uy * r) * inv_dp).round();
                if cx < 0.0 || cy < 0.0 || cx >= acc_cols as f32 || cy >= acc_rows as f32 {
                    break;
                }
                let cell = cy as usize * acc_cols + cx as usize;
                // one vote per cell and direction, even when radii round to the same cell
                if last_cell == Some(cell) {
                    continue;
                }
                acc[cell] += 1;
                last_cell = Some(cell);
            }
        }
    }

    acc
}

/// Collect the accumulator local maxima above the threshold, strongest first.
fn find_center_candidates(
    acc: &[u32],
    acc_cols: usize,
    acc_rows: usize,
    threshold: u32,
) -> Vec<CenterCandidate> {
    let mut candidates = Vec::new();
    for ay in 1..acc_rows.saturating_sub(1) {
        for ax in 1..acc_cols.saturating_sub(1) {
            let idx = ay * acc_cols + ax;
            let v = acc[idx];
            if v > threshold
                && v > acc[idx - 1]
                && v >= acc[idx + 1]
                && v > acc[idx - acc_cols]
                && v >= acc[idx + acc_cols]
            {
                candidates.push(CenterCandidate { ax, ay, votes: v });
            }
        }
    }

    // stable sort keeps raster order between equal votes
    candidates.sort_by(|a, b| b.votes.cmp(&a.votes));
    candidates
}

/// Pick the radius best supported by the edge pixels around a center.
///
/// Distances are binned per pixel of radius and scored over a three-bin window, so an edge
/// split across neighbouring bins by the pixel grid still counts as one circle.
/// Returns the radius and its support, or `None` when no edge pixel is in range.
fn estimate_radius(
    center: (f32, f32),
    edge_points: &[(usize, usize, f32, f32)],
    min_radius: u32,
    max_radius: u32,
) -> Option<(i32, u32)> {
    let num_bins = (max_radius - min_radius + 1) as usize;
    let mut counts = vec![0u32; num_bins];
    let mut sums = vec![0.0f32; num_bins];

    let (min_r, max_r) = (min_radius as f32, max_radius as f32);
    for &(x, y, _, _) in edge_points {
        let dx = x as f32 - center.0;
        let dy = y as f32 - center.1;
        let d = (dx * dx + dy * dy).sqrt();
        if d < min_r || d > max_r {
            continue;
        }
        let bin = ((d - min_r).round() as usize).min(num_bins - 1);
        counts[bin] += 1;
        sums[bin] += d;
    }

    let mut best: Option<(usize, u32)> = None;
    for bin in 0..num_bins {
        let lo = bin.saturating_sub(1);
        let hi = (bin + 1).min(num_bins - 1);
        let support: u32 = counts[lo..=hi].iter().sum();
        if support > 0 && best.map_or(true, |(_, s)| support > s) {
            best = Some((bin, support));
        }
    }

    best.map(|(bin, support)| {
        let lo = bin.saturating_sub(1);
        let hi = (bin + 1).min(num_bins - 1);
        let sum: f32 = sums[lo..=hi].iter().sum();
        let radius = (sum / support as f32).round() as i32;
        (radius, support)
    })
}

/// Detect circles in a grayscale image with the gradient Hough transform.
///
/// The input is expected to be smoothed already, e.g. with
/// [`crate::filter::gaussian_blur`], because the edge detector runs on it directly.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `config` - The detector parameters.
///
/// # Returns
///
/// The detected circles, ordered by decreasing center votes. An image without circles gives
/// an empty vector.
///
/// # Example
///
/// ```
/// use cuesight_image::Image;
/// use cuesight_imgproc::hough::{hough_circles, HoughCirclesConfig};
///
/// let flat = Image::<u8, 1>::from_size_val([64, 64].into(), 30).unwrap();
/// let circles = hough_circles(&flat, &HoughCirclesConfig::default()).unwrap();
/// assert!(circles.is_empty());
/// ```
pub fn hough_circles(
    src: &Image<u8, 1>,
    config: &HoughCirclesConfig,
) -> Result<Vec<HoughCircle>, ImageError> {
    config.validate()?;

    let (cols, rows) = (src.cols(), src.rows());
    if cols < 3 || rows < 3 {
        return Ok(Vec::new());
    }

    let mut edge_map = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    let gradients = edges::canny(
        src,
        &mut edge_map,
        config.canny_threshold / 2.0,
        config.canny_threshold,
    )?;

    // edge pixels with their unit gradient direction
    let gx = gradients.dx.as_slice();
    let gy = gradients.dy.as_slice();
    let edge_points: Vec<(usize, usize, f32, f32)> = edge_map
        .as_slice()
        .iter()
        .enumerate()
        .filter(|(_, &e)| e != 0)
        .filter_map(|(idx, _)| {
            let norm = (gx[idx] * gx[idx] + gy[idx] * gy[idx]).sqrt();
            if norm < f32::EPSILON {
                return None;
            }
            Some((idx % cols, idx / cols, gx[idx] / norm, gy[idx] / norm))
        })
        .collect();

    log::debug!("hough: {} edge pixels", edge_points.len());

    if edge_points.is_empty() {
        return Ok(Vec::new());
    }

    let acc_cols = (cols as f32 / config.dp).ceil() as usize;
    let acc_rows = (rows as f32 / config.dp).ceil() as usize;
    let acc = accumulate_votes(&edge_points, config, acc_cols, acc_rows);
    let candidates =
        find_center_candidates(&acc, acc_cols, acc_rows, config.accumulator_threshold);

    log::debug!("hough: {} center candidates", candidates.len());

    let min_dist_sq = config.min_dist * config.min_dist;
    let mut circles: Vec<HoughCircle> = Vec::new();
    for candidate in candidates {
        let center = (
            candidate.ax as f32 * config.dp,
            candidate.ay as f32 * config.dp,
        );

        let too_close = circles.iter().any(|c| {
            let dx = c.x as f32 - center.0;
            let dy = c.y as f32 - center.1;
            dx * dx + dy * dy < min_dist_sq
        });
        if too_close {
            continue;
        }

        let Some((radius, support)) = estimate_radius(
            center,
            &edge_points,
            config.min_radius,
            config.max_radius,
        ) else {
            continue;
        };

        if support < config.accumulator_threshold {
            continue;
        }

        circles.push(HoughCircle {
            x: center.0.round() as i32,
            y: center.1.round() as i32,
            radius,
            votes: candidate.votes,
        });
    }

    Ok(circles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesight_image::ImageSize;

    /// Draw filled disks `(cx, cy, radius, value)` on a uniform background.
    fn make_disk_image(
        width: usize,
        height: usize,
        background: u8,
        disks: &[(f32, f32, f32, u8)],
    ) -> Result<Image<u8, 1>, ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(ImageSize { width, height }, background)?;
        for y in 0..height {
            for x in 0..width {
                for &(cx, cy, r, value) in disks {
                    let dx = x as f32 - cx;
                    let dy = y as f32 - cy;
                    if dx * dx + dy * dy <= r * r {
                        img.as_slice_mut()[y * width + x] = value;
                    }
                }
            }
        }
        let mut blurred = img.clone();
        crate::filter::gaussian_blur(&img, &mut blurred, (5, 5), (0.0, 0.0))?;
        Ok(blurred)
    }

    #[test]
    fn test_single_disk() -> Result<(), ImageError> {
        let img = make_disk_image(120, 100, 40, &[(60.0, 50.0, 14.0, 230)])?;

        let circles = hough_circles(&img, &HoughCirclesConfig::default())?;

        assert_eq!(circles.len(), 1, "circles: {circles:?}");
        let c = circles[0];
        assert!((c.x - 60).abs() <= 1 && (c.y - 50).abs() <= 1, "{c:?}");
        assert!((c.radius - 14).abs() <= 1, "{c:?}");
        assert!(c.votes > 15);
        Ok(())
    }

    #[test]
    fn test_dark_and_bright_disks() -> Result<(), ImageError> {
        let disks = [
            (40.0, 40.0, 12.0, 250),
            (120.0, 40.0, 16.0, 250),
            (80.0, 110.0, 14.0, 0),
        ];
        let img = make_disk_image(160, 150, 128, &disks)?;

        let circles = hough_circles(&img, &HoughCirclesConfig::default())?;

        assert_eq!(circles.len(), disks.len(), "circles: {circles:?}");
        for &(cx, cy, r, _) in &disks {
            let found = circles.iter().any(|c| {
                (c.x - cx as i32).abs() <= 1
                    && (c.y - cy as i32).abs() <= 1
                    && (c.radius - r as i32).abs() <= 1
            });
            assert!(found, "disk at ({cx}, {cy}) r={r} not found in {circles:?}");
        }
        Ok(())
    }

    #[test]
    fn test_radius_out_of_range_is_ignored() -> Result<(), ImageError> {
        let img = make_disk_image(120, 120, 40, &[(60.0, 60.0, 35.0, 230)])?;
        let circles = hough_circles(&img, &HoughCirclesConfig::default())?;
        assert!(circles.is_empty(), "circles: {circles:?}");
        Ok(())
    }

    #[test]
    fn test_invalid_config() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::from_size_val([32, 32].into(), 0)?;
        let config = HoughCirclesConfig {
            min_radius: 20,
            max_radius: 10,
            ..Default::default()
        };
        assert!(hough_circles(&img, &config).is_err());
        Ok(())
    }
}
