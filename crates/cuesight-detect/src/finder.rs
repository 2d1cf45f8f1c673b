use cuesight_image::{Image, ImageError};
use cuesight_imgproc::{color, enhance, filter, hough, resize};
use serde::{Deserialize, Serialize};

use crate::config::{DetectorConfig, PreprocessConfig, RegionConfig};

/// A circle found in the processed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedCircle {
    /// Center column in processed image pixels.
    pub x: i32,
    /// Center row in processed image pixels.
    pub y: i32,
    /// Radius in processed image pixels.
    pub radius: i32,
    /// Scale factor from the source image to the processed image.
    pub scale: f64,
}

impl DetectedCircle {
    /// The center in source image pixels.
    pub fn source_center(&self) -> (f64, f64) {
        (self.x as f64 / self.scale, self.y as f64 / self.scale)
    }
}

/// Downsample an image and adjust its contrast and brightness.
///
/// The image is resized by `resize_factor` with bilinear interpolation, then every channel
/// is mapped to `clamp(p * (contrast / 127 + 1) - contrast + brightness, 0, 255)`.
///
/// # Arguments
///
/// * `src` - The source RGB image.
/// * `config` - The contrast, brightness and scale factor.
///
/// # Returns
///
/// The processed image.
pub fn preprocess(
    src: &Image<u8, 3>,
    config: &PreprocessConfig,
) -> Result<Image<u8, 3>, ImageError> {
    let resized = resize::resize_by_factor(src, config.resize_factor)?;
    let mut processed = Image::<u8, 3>::from_size_val(resized.size(), 0)?;
    enhance::adjust_contrast_brightness(
        &resized,
        &mut processed,
        config.contrast,
        config.brightness,
    )?;

    log::debug!("preprocess: {} -> {}", src.size(), processed.size());

    Ok(processed)
}

/// Detect disk-shaped blobs in a processed image.
///
/// The image is converted to grayscale and smoothed with a square Gaussian kernel before
/// running the gradient Hough transform.
///
/// # Arguments
///
/// * `src` - The processed RGB image.
/// * `blur_kernel_size` - The odd size of the Gaussian kernel.
/// * `config` - The circle detector parameters.
/// * `scale` - The scale factor that produced `src`, carried by every circle.
///
/// # Returns
///
/// The circles in detection order. No circle is not an error.
pub fn detect_circles(
    src: &Image<u8, 3>,
    blur_kernel_size: usize,
    config: &hough::HoughCirclesConfig,
    scale: f64,
) -> Result<Vec<DetectedCircle>, ImageError> {
    let mut gray = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    color::gray_from_rgb_u8(src, &mut gray)?;

    let mut blurred = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    filter::gaussian_blur(
        &gray,
        &mut blurred,
        (blur_kernel_size, blur_kernel_size),
        (0.0, 0.0),
    )?;

    let circles = hough::hough_circles(&blurred, config)?
        .into_iter()
        .map(|c| DetectedCircle {
            x: c.x,
            y: c.y,
            radius: c.radius,
            scale,
        })
        .collect();

    Ok(circles)
}

/// Keep the circles whose center lies inside the closed region, in their original order.
pub fn filter_by_region(
    circles: &[DetectedCircle],
    region: &RegionConfig,
) -> Vec<DetectedCircle> {
    circles
        .iter()
        .filter(|c| region.contains(c.x, c.y))
        .copied()
        .collect()
}

/// The output of [`RegionCircleFinder::find`].
#[derive(Debug, Clone)]
pub struct CircleDetections {
    /// The preprocessed image the circles were found in.
    pub processed: Image<u8, 3>,
    /// Every circle found, in detection order.
    pub all_circles: Vec<DetectedCircle>,
    /// The circles inside the search region, in detection order.
    pub circles: Vec<DetectedCircle>,
}

/// Finds ball-sized circles inside the table region of an image.
#[derive(Debug, Clone)]
pub struct RegionCircleFinder {
    preprocess: PreprocessConfig,
    blur_kernel_size: usize,
    hough: hough::HoughCirclesConfig,
    region: RegionConfig,
}

impl RegionCircleFinder {
    /// Create a finder from the detector configuration.
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            preprocess: config.preprocess.clone(),
            blur_kernel_size: config.blur_kernel_size,
            hough: config.hough.clone(),
            region: config.region,
        }
    }

    /// Preprocess a source image, detect circles and keep those inside the region.
    pub fn find(&self, src: &Image<u8, 3>) -> Result<CircleDetections, ImageError> {
        let processed = preprocess(src, &self.preprocess)?;
        let all_circles = detect_circles(
            &processed,
            self.blur_kernel_size,
            &self.hough,
            self.preprocess.resize_factor,
        )?;
        let circles = filter_by_region(&all_circles, &self.region);

        log::debug!(
            "finder: {} circles, {} inside the region",
            all_circles.len(),
            circles.len()
        );

        Ok(CircleDetections {
            processed,
            all_circles,
            circles,
        })
    }
}
