use cuesight_image::{Image, ImageError};

use crate::{filter, rows};

// tan(22.5 deg) and tan(67.5 deg), the sector limits of the gradient direction
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

const NOT_EDGE: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

/// Image gradients of a grayscale image.
#[derive(Clone, Debug)]
pub struct Gradients {
    /// Horizontal derivative.
    pub dx: Image<f32, 1>,
    /// Vertical derivative.
    pub dy: Image<f32, 1>,
}

impl Gradients {
    /// Compute the 3x3 sobel gradients of a grayscale image.
    pub fn compute(src: &Image<u8, 1>) -> Result<Self, ImageError> {
        let mut dx = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
        let mut dy = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
        filter::spatial_gradient(src, &mut dx, &mut dy)?;
        Ok(Self { dx, dy })
    }

    /// L1 gradient magnitude `|dx| + |dy|` at every pixel.
    pub fn magnitude_l1(&self) -> Vec<f32> {
        self.dx
            .as_slice()
            .iter()
            .zip(self.dy.as_slice())
            .map(|(gx, gy)| gx.abs() + gy.abs())
            .collect()
    }
}

/// Detect edges with the Canny algorithm.
///
/// The gradients are computed with a 3x3 sobel operator and their L1 magnitude is thinned by
/// non-maximum suppression along the quantized gradient direction. Pixels above
/// `high_threshold` seed the edges, which grow through 8-connected pixels above
/// `low_threshold`.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output edge map, 255 on edges and 0 elsewhere.
/// * `low_threshold` - The hysteresis lower threshold.
/// * `high_threshold` - The hysteresis upper threshold.
///
/// # Returns
///
/// The gradients used to compute the edges, so callers can reuse them.
///
/// PRECONDITION: `src` and `dst` must have the same size.
pub fn canny(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    low_threshold: f32,
    high_threshold: f32,
) -> Result<Gradients, ImageError> {
    rows::check_same_size(src, dst)?;

    if low_threshold > high_threshold {
        return Err(ImageError::InvalidParameter(
            "canny thresholds",
            format!("low {low_threshold} > high {high_threshold}"),
        ));
    }

    let gradients = Gradients::compute(src)?;
    let (cols, rows) = (src.cols(), src.rows());
    let mag = gradients.magnitude_l1();
    let gx = gradients.dx.as_slice();
    let gy = gradients.dy.as_slice();

    let mag_at = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= cols as isize || y >= rows as isize {
            0.0
        } else {
            mag[y as usize * cols + x as usize]
        }
    };

    // non-maximum suppression
    let mut labels = vec![NOT_EDGE; cols * rows];
    let mut stack = Vec::new();
    for y in 0..rows {
        for x in 0..cols {
            let idx = y * cols + x;
            let m = mag[idx];
            if m <= low_threshold {
                continue;
            }

            let (xi, yi) = (x as isize, y as isize);
            let (ax, ay) = (gx[idx].abs(), gy[idx].abs());
            let is_max = if ay <= ax * TAN_22_5 {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else if ay > ax * TAN_67_5 {
                m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
            } else if (gx[idx] > 0.0) == (gy[idx] > 0.0) {
                m > mag_at(xi - 1, yi - 1) && m >= mag_at(xi + 1, yi + 1)
            } else {
                m > mag_at(xi + 1, yi - 1) && m >= mag_at(xi - 1, yi + 1)
            };

            if !is_max {
                continue;
            }

            if m > high_threshold {
                labels[idx] = STRONG;
                stack.push(idx);
            } else {
                labels[idx] = WEAK;
            }
        }
    }

    // hysteresis
    while let Some(idx) = stack.pop() {
        let (x, y) = ((idx % cols) as isize, (idx / cols) as isize);
        for (ox, oy) in [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ] {
            let (nx, ny) = (x + ox, y + oy);
            if nx < 0 || ny < 0 || nx >= cols as isize || ny >= rows as isize {
                continue;
            }
            let nidx = ny as usize * cols + nx as usize;
            if labels[nidx] == WEAK {
                labels[nidx] = STRONG;
                stack.push(nidx);
            }
        }
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(labels.iter())
        .for_each(|(out, &label)| *out = if label == STRONG { 255 } else { 0 });

    Ok(gradients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesight_image::ImageSize;

    #[test]
    fn canny_vertical_step() -> Result<(), ImageError> {
        let (width, height) = (20, 10);
        let data = (0..height)
            .flat_map(|_| (0..width).map(|x| if x < 10 { 0u8 } else { 200 }))
            .collect();
        let img = Image::<u8, 1>::new(ImageSize { width, height }, data)?;

        let mut edges = Image::<u8, 1>::from_size_val(img.size(), 0)?;
        canny(&img, &mut edges, 50.0, 100.0)?;

        for y in 0..height {
            for x in 0..width {
                let expected = if x == 9 { 255 } else { 0 };
                assert_eq!(edges.get_pixel(x, y, 0)?, expected, "pixel ({x}, {y})");
            }
        }
        Ok(())
    }

    #[test]
    fn canny_flat_image_has_no_edges() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::from_size_val([16, 16].into(), 77)?;
        let mut edges = Image::<u8, 1>::from_size_val(img.size(), 0)?;
        canny(&img, &mut edges, 50.0, 100.0)?;
        assert!(edges.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn canny_weak_edges_need_a_strong_seed() -> Result<(), ImageError> {
        // a faint step: gradient magnitude 4 * 20 = 80, between the thresholds
        let (width, height) = (12, 6);
        let data = (0..height)
            .flat_map(|_| (0..width).map(|x| if x < 6 { 100u8 } else { 120 }))
            .collect();
        let img = Image::<u8, 1>::new(ImageSize { width, height }, data)?;

        let mut edges = Image::<u8, 1>::from_size_val(img.size(), 0)?;
        canny(&img, &mut edges, 50.0, 100.0)?;
        assert!(edges.as_slice().iter().all(|&v| v == 0));

        canny(&img, &mut edges, 50.0, 70.0)?;
        assert_eq!(edges.as_slice().iter().filter(|&&v| v == 255).count(), height);
        Ok(())
    }

    #[test]
    fn canny_invalid_thresholds() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        let mut edges = img.clone();
        assert!(canny(&img, &mut edges, 100.0, 50.0).is_err());
        Ok(())
    }
}
