use cuesight_image::{Image, ImageError};

use super::{kernels, separable_filter, FloatConversion};

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y). Both must be odd.
/// * `sigma` - The sigma of the gaussian kernel. Zero derives the sigma from the kernel size.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use cuesight_image::Image;
/// use cuesight_imgproc::filter::gaussian_blur;
///
/// let src = Image::<u8, 1>::from_size_val([8, 8].into(), 42).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// gaussian_blur(&src, &mut dst, (5, 5), (0.0, 0.0)).unwrap();
/// assert_eq!(dst.as_slice(), src.as_slice());
/// ```
pub fn gaussian_blur<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
) -> Result<(), ImageError>
where
    T: FloatConversion,
{
    for size in [kernel_size.0, kernel_size.1] {
        if size == 0 || size % 2 == 0 {
            return Err(ImageError::InvalidParameter(
                "gaussian kernel size",
                size.to_string(),
            ));
        }
    }

    let kernel_x = kernels::gaussian_kernel_1d(kernel_size.0, sigma.0);
    let kernel_y = kernels::gaussian_kernel_1d(kernel_size.1, sigma.1);
    separable_filter(src, dst, &kernel_x, &kernel_y)?;
    Ok(())
}

/// Compute the first order image derivatives with a 3x3 sobel operator.
///
/// # Arguments
///
/// * `src` - The source grayscale image.
/// * `dx` - The horizontal derivative, positive when intensity grows to the right.
/// * `dy` - The vertical derivative, positive when intensity grows downwards.
///
/// PRECONDITION: `src`, `dx` and `dy` must have the same size.
pub fn spatial_gradient<T>(
    src: &Image<T, 1>,
    dx: &mut Image<f32, 1>,
    dy: &mut Image<f32, 1>,
) -> Result<(), ImageError>
where
    T: FloatConversion,
{
    let (kernel_deriv, kernel_smooth) = kernels::sobel_kernel_1d(3)?;
    separable_filter(src, dx, &kernel_deriv, &kernel_smooth)?;
    separable_filter(src, dy, &kernel_smooth, &kernel_deriv)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesight_image::ImageSize;

    #[test]
    fn test_gaussian_blur_preserves_mass() -> Result<(), ImageError> {
        let mut data = vec![0.0f32; 9 * 9];
        data[4 * 9 + 4] = 100.0;
        let img = Image::<f32, 1>::new(
            ImageSize {
                width: 9,
                height: 9,
            },
            data,
        )?;

        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        gaussian_blur(&img, &mut dst, (5, 5), (0.0, 0.0))?;

        let total: f32 = dst.as_slice().iter().sum();
        approx::assert_relative_eq!(total, 100.0, epsilon = 1e-3);

        let center = dst.get_pixel(4, 4, 0)?;
        assert!(dst.as_slice().iter().all(|&v| v <= center));
        approx::assert_relative_eq!(dst.get_pixel(3, 4, 0)?, dst.get_pixel(5, 4, 0)?);
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_even_kernel() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        let mut dst = img.clone();
        assert!(gaussian_blur(&img, &mut dst, (4, 5), (0.0, 0.0)).is_err());
        Ok(())
    }

    #[test]
    fn test_spatial_gradient_vertical_step() -> Result<(), ImageError> {
        // left half dark, right half bright
        let (width, height) = (6, 5);
        let data = (0..height)
            .flat_map(|_| (0..width).map(|x| if x < 3 { 0u8 } else { 10 }))
            .collect();
        let img = Image::<u8, 1>::new(ImageSize { width, height }, data)?;

        let mut dx = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        let mut dy = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        spatial_gradient(&img, &mut dx, &mut dy)?;

        // (-1 * 0 + 1 * 10) * (1 + 2 + 1) at the step, zero away from it
        approx::assert_relative_eq!(dx.get_pixel(2, 2, 0)?, 40.0);
        approx::assert_relative_eq!(dx.get_pixel(3, 2, 0)?, 40.0);
        approx::assert_relative_eq!(dx.get_pixel(0, 2, 0)?, 0.0);
        assert!(dy.as_slice().iter().all(|&v| v.abs() < 1e-6));
        Ok(())
    }
}
