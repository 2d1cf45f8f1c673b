use cuesight_image::{Image, ImageError};

use crate::rows;

/// Trait for floating point casting
pub trait FloatConversion {
    /// Convert the type to f32
    fn to_f32(&self) -> f32;
    /// Convert the type from f32
    fn from_f32(val: f32) -> Self;
}

impl FloatConversion for f32 {
    fn to_f32(&self) -> f32 {
        *self
    }

    fn from_f32(val: f32) -> Self {
        val
    }
}

impl FloatConversion for u8 {
    fn to_f32(&self) -> f32 {
        *self as f32
    }

    fn from_f32(val: f32) -> Self {
        val.round().clamp(0.0, 255.0) as u8
    }
}

/// Map an index outside `[0, len)` back inside by mirroring around the border pixel.
///
/// `... 2 1 | 0 1 2 ... n-1 | n-2 n-3 ...`
pub(crate) fn reflect101_index(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let mut i = idx;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= len {
            i = 2 * len - i - 2;
        } else {
            return i as usize;
        }
    }
}

/// Apply a separable filter to an image.
///
/// The horizontal kernel is applied first and the vertical kernel second. Pixels beyond the
/// image border are mirrored without repeating the border pixel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn separable_filter<T, U, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError>
where
    T: FloatConversion,
    U: FloatConversion,
{
    rows::check_same_size(src, dst)?;

    if kernel_x.is_empty() || kernel_y.is_empty() {
        return Err(ImageError::InvalidParameter(
            "kernel",
            "separable kernels must not be empty".to_string(),
        ));
    }

    let (rows, cols) = (src.rows(), src.cols());
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;

    let src_data = src.as_slice();
    let mut temp = vec![0.0f32; src_data.len()];

    // horizontal
    for r in 0..rows {
        let row_offset = r * cols * C;
        for c in 0..cols {
            let mut acc = [0.0f32; C];
            for (i, &k) in kernel_x.iter().enumerate() {
                let x = reflect101_index(c as isize + i as isize - half_x, cols);
                let idx = row_offset + x * C;
                for (ch, acc_val) in acc.iter_mut().enumerate() {
                    *acc_val += src_data[idx + ch].to_f32() * k;
                }
            }
            temp[row_offset + c * C..row_offset + (c + 1) * C].copy_from_slice(&acc);
        }
    }

    // vertical
    let dst_data = dst.as_slice_mut();
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = [0.0f32; C];
            for (i, &k) in kernel_y.iter().enumerate() {
                let y = reflect101_index(r as isize + i as isize - half_y, rows);
                let idx = (y * cols + c) * C;
                for (ch, acc_val) in acc.iter_mut().enumerate() {
                    *acc_val += temp[idx + ch] * k;
                }
            }
            let out_idx = (r * cols + c) * C;
            for (ch, &acc_val) in acc.iter().enumerate() {
                dst_data[out_idx + ch] = U::from_f32(acc_val);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesight_image::ImageSize;

    #[test]
    fn test_reflect101_index() {
        assert_eq!(reflect101_index(-1, 5), 1);
        assert_eq!(reflect101_index(-2, 5), 2);
        assert_eq!(reflect101_index(5, 5), 3);
        assert_eq!(reflect101_index(6, 5), 2);
        assert_eq!(reflect101_index(3, 5), 3);
        assert_eq!(reflect101_index(-3, 2), 1);
        assert_eq!(reflect101_index(4, 1), 0);
    }

    #[test]
    fn test_separable_filter_box() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let img = Image::<f32, 1>::new(
            ImageSize { width: 5, height: 5 },
            vec![
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 9.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
            ],
        )?;

        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        let kernel = [1.0 / 3.0; 3];
        separable_filter(&img, &mut dst, &kernel, &kernel)?;

        for y in 0..5 {
            for x in 0..5 {
                let expected = if (1..=3).contains(&x) && (1..=3).contains(&y) {
                    1.0
                } else {
                    0.0
                };
                approx::assert_abs_diff_eq!(dst.get_pixel(x, y, 0)?, expected, epsilon = 1e-5);
            }
        }
        Ok(())
    }

    #[test]
    fn test_separable_filter_constant_border() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::from_size_val([4, 3].into(), 120)?;
        let mut dst = Image::<u8, 1>::from_size_val(img.size(), 0)?;
        let kernel = crate::filter::kernels::gaussian_kernel_1d(5, 0.0);
        separable_filter(&img, &mut dst, &kernel, &kernel)?;
        assert!(dst.as_slice().iter().all(|&v| v == 120));
        Ok(())
    }
}
