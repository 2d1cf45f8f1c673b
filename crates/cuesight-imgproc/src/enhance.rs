use cuesight_image::{Image, ImageError};

use crate::rows;

/// Adjust the contrast and brightness of an 8-bit image.
///
/// Every channel value is remapped with the affine formula:
///
/// dst(x,y,c) = clamp(src(x,y,c) * (contrast / 127 + 1) - contrast + brightness, 0, 255)
///
/// The remapped value is truncated towards zero when stored back as `u8`.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image to store the result.
/// * `contrast` - The contrast offset. Zero keeps the original contrast.
/// * `brightness` - The brightness offset added after the contrast stretch.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
///
/// # Example
///
/// ```
/// use cuesight_image::{Image, ImageSize};
/// use cuesight_imgproc::enhance::adjust_contrast_brightness;
///
/// let src = Image::<u8, 1>::new(ImageSize { width: 2, height: 1 }, vec![0, 100]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// adjust_contrast_brightness(&src, &mut dst, 50.0, 130.0).unwrap();
/// assert_eq!(dst.as_slice(), &[80, 219]);
/// ```
pub fn adjust_contrast_brightness<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    contrast: f64,
    brightness: f64,
) -> Result<(), ImageError> {
    rows::check_same_size(src, dst)?;

    if !contrast.is_finite() || !brightness.is_finite() {
        return Err(ImageError::InvalidParameter(
            "contrast/brightness",
            format!("{contrast}/{brightness}"),
        ));
    }

    let gain = contrast / 127.0 + 1.0;
    let offset = brightness - contrast;

    rows::iter_rows_val(src, dst, |&src_val, dst_val| {
        let val = (src_val as f64 * gain + offset).clamp(0.0, 255.0);
        *dst_val = val as u8;
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use cuesight_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_adjust_contrast_brightness() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0, 100, 255, 10, 20, 183],
        )?;
        let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0)?;

        super::adjust_contrast_brightness(&src, &mut dst, 50.0, 130.0)?;

        // 10 * 1.3937 + 80 = 93.93 and 20 * 1.3937 + 80 = 107.87 truncate down
        assert_eq!(dst.as_slice(), &[80, 219, 255, 93, 107, 255]);
        Ok(())
    }

    #[test]
    fn test_adjust_contrast_brightness_clamps_low() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![10, 100],
        )?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

        super::adjust_contrast_brightness(&src, &mut dst, 127.0, 0.0)?;

        assert_eq!(dst.as_slice(), &[0, 73]);
        Ok(())
    }

    #[test]
    fn test_adjust_contrast_brightness_identity() -> Result<(), ImageError> {
        let data: Vec<u8> = (0..=255).collect();
        let src = Image::<u8, 1>::new(
            ImageSize {
                width: 256,
                height: 1,
            },
            data.clone(),
        )?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

        super::adjust_contrast_brightness(&src, &mut dst, 0.0, 0.0)?;

        assert_eq!(dst.as_slice(), data.as_slice());
        Ok(())
    }
}
