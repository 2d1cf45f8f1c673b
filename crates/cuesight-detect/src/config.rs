use std::path::{Path, PathBuf};

use cuesight_imgproc::hough::HoughCirclesConfig;
use serde::{Deserialize, Serialize};

use crate::error::DetectError;

/// Contrast, brightness and downsampling applied before detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Contrast offset; the gain is `contrast / 127 + 1`.
    pub contrast: f64,
    /// Brightness offset added after the contrast gain.
    pub brightness: f64,
    /// Scale factor from the source image to the processed image.
    pub resize_factor: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            contrast: 50.0,
            brightness: 130.0,
            resize_factor: 0.5,
        }
    }
}

/// The closed rectangle of the processed image where ball centers are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Smallest accepted column.
    pub x_min: i32,
    /// Largest accepted column.
    pub x_max: i32,
    /// Smallest accepted row.
    pub y_min: i32,
    /// Largest accepted row.
    pub y_max: i32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            x_min: 75,
            x_max: 725,
            y_min: 170,
            y_max: 450,
        }
    }
}

impl RegionConfig {
    /// Whether `(x, y)` lies inside the region, borders included.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

/// Parameters of the cue ball color test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Smallest diagonal offset sampled around a center.
    pub min_offset: u32,
    /// Largest diagonal offset sampled around a center.
    pub max_offset: u32,
    /// Every channel of a sample must be strictly above this value.
    pub white_threshold: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_offset: 5,
            max_offset: 9,
            white_threshold: 253,
        }
    }
}

/// Configuration of the ball detector.
///
/// Missing fields of a JSON file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Preprocessing parameters.
    pub preprocess: PreprocessConfig,
    /// Size of the square Gaussian kernel applied before circle detection.
    pub blur_kernel_size: usize,
    /// Circle detector parameters, in processed image pixels.
    pub hough: HoughCirclesConfig,
    /// Region of the processed image where balls are accepted.
    pub region: RegionConfig,
    /// Cue ball classification parameters.
    pub classifier: ClassifierConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            blur_kernel_size: 5,
            hough: HoughCirclesConfig::default(),
            region: RegionConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Check that the configuration describes a usable detector.
    pub fn validate(&self) -> Result<(), DetectError> {
        let p = &self.preprocess;
        if !p.resize_factor.is_finite() || p.resize_factor <= 0.0 {
            return Err(DetectError::InvalidConfig(format!(
                "resize factor must be positive, got {}",
                p.resize_factor
            )));
        }
        if !p.contrast.is_finite() || !p.brightness.is_finite() {
            return Err(DetectError::InvalidConfig(format!(
                "contrast and brightness must be finite, got {} and {}",
                p.contrast, p.brightness
            )));
        }

        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(DetectError::InvalidConfig(format!(
                "blur kernel size must be odd, got {}",
                self.blur_kernel_size
            )));
        }

        self.hough
            .validate()
            .map_err(|e| DetectError::InvalidConfig(e.to_string()))?;

        let r = &self.region;
        if r.x_min > r.x_max || r.y_min > r.y_max {
            return Err(DetectError::InvalidConfig(format!(
                "empty region x [{}, {}] y [{}, {}]",
                r.x_min, r.x_max, r.y_min, r.y_max
            )));
        }

        let c = &self.classifier;
        if c.min_offset == 0 || c.min_offset > c.max_offset {
            return Err(DetectError::InvalidConfig(format!(
                "classifier offsets [{}, {}]",
                c.min_offset, c.max_offset
            )));
        }

        Ok(())
    }

    /// Read a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DetectError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DetectError::FileError(path.to_owned(), e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Where the detection results are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory of all the output files.
    pub output_dir: PathBuf,
    /// File with the cue ball world coordinates.
    pub cue_ball_file: PathBuf,
    /// File with one row of world coordinates per object ball.
    pub object_balls_file: PathBuf,
    /// File with the number of object balls.
    pub count_file: PathBuf,
    /// PNG overlay of the detections, if any.
    pub overlay_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            cue_ball_file: "cue_ball_world.csv".into(),
            object_balls_file: "object_balls_world.csv".into(),
            count_file: "object_ball_count.csv".into(),
            overlay_file: Some("detections.png".into()),
        }
    }
}
