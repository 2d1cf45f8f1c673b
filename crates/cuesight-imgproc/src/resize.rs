use cuesight_image::{Image, ImageError, ImageSize};

/// Source coordinate and interpolation weight along one axis.
#[derive(Clone, Copy, Debug)]
struct AxisSample {
    i0: usize,
    i1: usize,
    frac: f32,
}

/// Precompute the bilinear taps for every destination index along one axis.
///
/// Pixel centers are aligned, so destination index `d` samples the source at
/// `(d + 0.5) * scale - 0.5`, clamped to the valid range.
fn axis_samples(src_len: usize, dst_len: usize) -> Vec<AxisSample> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len - 1;
    (0..dst_len)
        .map(|d| {
            let s = ((d as f32 + 0.5) * scale - 0.5).max(0.0);
            let i0 = (s.trunc() as usize).min(last);
            let i1 = if i0 < last { i0 + 1 } else { i0 };
            let frac = if i0 < last { s - i0 as f32 } else { 0.0 };
            AxisSample { i0, i1, frac }
        })
        .collect()
}

/// Resize an 8-bit image to the size of `dst` using bilinear interpolation.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container. Its size defines the output size.
///
/// # Errors
///
/// Returns an error if either image is empty.
///
/// # Example
///
/// ```
/// use cuesight_image::{Image, ImageSize};
/// use cuesight_imgproc::resize::resize_bilinear;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 4,
///     },
///     vec![10u8; 4 * 4 * 3],
/// )
/// .unwrap();
///
/// let mut image_resized = Image::<u8, 3>::from_size_val([2, 2].into(), 0).unwrap();
/// resize_bilinear(&image, &mut image_resized).unwrap();
///
/// assert_eq!(image_resized.size().width, 2);
/// assert_eq!(image_resized.as_slice(), &[10u8; 2 * 2 * 3]);
/// ```
pub fn resize_bilinear<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.width() == 0 || src.height() == 0 {
        return Err(ImageError::EmptyImage(src.width(), src.height()));
    }
    if dst.width() == 0 || dst.height() == 0 {
        return Err(ImageError::EmptyImage(dst.width(), dst.height()));
    }

    let xs = axis_samples(src.width(), dst.width());
    let ys = axis_samples(src.height(), dst.height());

    let src_cols = src.cols();
    let src_data = src.as_slice();
    let dst_cols = dst.cols();

    dst.as_slice_mut()
        .chunks_exact_mut(C * dst_cols)
        .zip(ys.iter())
        .for_each(|(dst_row, ys)| {
            let frac_v = ys.frac;
            let frac_vv = 1.0 - frac_v;
            for (dst_pixel, xs) in dst_row.chunks_exact_mut(C).zip(xs.iter()) {
                let frac_u = xs.frac;
                let frac_uu = 1.0 - frac_u;

                let w00 = frac_uu * frac_vv;
                let w01 = frac_u * frac_vv;
                let w10 = frac_uu * frac_v;
                let w11 = frac_u * frac_v;

                let base00 = (ys.i0 * src_cols + xs.i0) * C;
                let base01 = (ys.i0 * src_cols + xs.i1) * C;
                let base10 = (ys.i1 * src_cols + xs.i0) * C;
                let base11 = (ys.i1 * src_cols + xs.i1) * C;

                for (k, out) in dst_pixel.iter_mut().enumerate() {
                    let val = src_data[base00 + k] as f32 * w00
                        + src_data[base01 + k] as f32 * w01
                        + src_data[base10 + k] as f32 * w10
                        + src_data[base11 + k] as f32 * w11;
                    *out = val.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    Ok(())
}

/// Compute the size of an image scaled by `factor`, rounding each side to the nearest pixel.
///
/// # Errors
///
/// Returns an error if the factor is not a positive finite number or the result is empty.
pub fn scaled_size(size: ImageSize, factor: f64) -> Result<ImageSize, ImageError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ImageError::InvalidParameter(
            "resize factor",
            factor.to_string(),
        ));
    }

    let new_size = ImageSize {
        width: (size.width as f64 * factor).round() as usize,
        height: (size.height as f64 * factor).round() as usize,
    };

    if new_size.width == 0 || new_size.height == 0 {
        return Err(ImageError::EmptyImage(new_size.width, new_size.height));
    }

    Ok(new_size)
}

/// Resize an 8-bit image by a uniform scale factor using bilinear interpolation.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `factor` - The scale factor applied to both sides, e.g. `0.5` halves the image.
///
/// # Returns
///
/// The resized image.
pub fn resize_by_factor<const C: usize>(
    src: &Image<u8, C>,
    factor: f64,
) -> Result<Image<u8, C>, ImageError> {
    let new_size = scaled_size(src.size(), factor)?;
    let mut dst = Image::<u8, C>::from_size_val(new_size, 0)?;
    resize_bilinear(src, &mut dst)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use cuesight_image::{Image, ImageError, ImageSize};

    #[test]
    fn resize_half_averages_blocks() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 4,
                height: 2,
            },
            vec![
                0, 100, 200, 200,
                100, 200, 0, 0,
            ],
        )?;

        let resized = super::resize_by_factor(&image, 0.5)?;

        assert_eq!(resized.size(), ImageSize { width: 2, height: 1 });
        assert_eq!(resized.as_slice(), &[100, 100]);
        Ok(())
    }

    #[test]
    fn resize_identity() -> Result<(), ImageError> {
        let data: Vec<u8> = (0..5 * 3 * 3).map(|v| v as u8).collect();
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 5,
                height: 3,
            },
            data.clone(),
        )?;

        let resized = super::resize_by_factor(&image, 1.0)?;
        assert_eq!(resized.as_slice(), data.as_slice());
        Ok(())
    }

    #[test]
    fn resize_upscale_edges_clamped() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0, 100],
        )?;

        let resized = super::resize_by_factor(&image, 2.0)?;

        assert_eq!(resized.size(), ImageSize { width: 4, height: 2 });
        assert_eq!(&resized.as_slice()[..4], &[0, 25, 75, 100]);
        Ok(())
    }

    #[test]
    fn resize_invalid_factor() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        assert!(super::resize_by_factor(&image, 0.0).is_err());
        assert!(super::resize_by_factor(&image, f64::NAN).is_err());
        assert!(matches!(
            super::resize_by_factor(&image, 0.01),
            Err(ImageError::EmptyImage(0, 0))
        ));
        Ok(())
    }
}
