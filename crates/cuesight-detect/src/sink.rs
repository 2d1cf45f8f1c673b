use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use cuesight_calib::WorldPoint;
use cuesight_image::Image;

use crate::{config::OutputConfig, error::DetectError, mapper::MappedBall};

/// Receives the results of a detection.
pub trait ResultSink {
    /// Persist the world positions of the cue ball and of the object balls.
    ///
    /// Balls whose position could not be projected are skipped, and the object ball count
    /// is the number of object balls actually kept. A position file with nothing to hold is
    /// removed so no earlier result outlives the current one.
    fn save(
        &mut self,
        cue_ball: Option<&MappedBall>,
        object_balls: &[MappedBall],
    ) -> Result<(), DetectError>;

    /// Show the overlay of the detections.
    fn display(&mut self, overlay: &Image<u8, 3>) -> Result<(), DetectError>;
}

/// Writes the results as comma-separated files and the overlay as a PNG image.
#[derive(Debug, Clone)]
pub struct CsvResultSink {
    config: OutputConfig,
    written: Vec<PathBuf>,
}

fn projected(ball: &MappedBall) -> Option<WorldPoint> {
    match &ball.world {
        Ok(p) => Some(*p),
        Err(e) => {
            log::warn!(
                "skipping ball at pixel ({}, {}): {e}",
                ball.pixel.0,
                ball.pixel.1
            );
            None
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), DetectError> {
    let mut file =
        fs::File::create(path).map_err(|e| DetectError::FileError(path.to_owned(), e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| DetectError::FileError(path.to_owned(), e))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

fn format_rows(points: &[WorldPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{:.6},{:.6}\n", p.x, p.y))
        .collect()
}

impl CsvResultSink {
    /// Create a sink writing into the configured output directory.
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            written: Vec::new(),
        }
    }

    /// The files written so far.
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }

    fn output_path(&self, file: &Path) -> Result<PathBuf, DetectError> {
        let dir = &self.config.output_dir;
        fs::create_dir_all(dir).map_err(|e| DetectError::FileError(dir.clone(), e))?;
        Ok(dir.join(file))
    }

    /// Remove a result file left by an earlier run.
    fn remove(&self, file: &Path) -> Result<(), DetectError> {
        let path = self.config.output_dir.join(file);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("removed stale {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DetectError::FileError(path, e)),
        }
    }

    fn write(&mut self, file: &Path, contents: &str) -> Result<(), DetectError> {
        let path = self.output_path(file)?;
        write_file(&path, contents)?;
        self.written.push(path);
        Ok(())
    }
}

impl ResultSink for CsvResultSink {
    fn save(
        &mut self,
        cue_ball: Option<&MappedBall>,
        object_balls: &[MappedBall],
    ) -> Result<(), DetectError> {
        match cue_ball.and_then(projected) {
            Some(p) => {
                let file = self.config.cue_ball_file.clone();
                self.write(&file, &format_rows(&[p]))?;
            }
            None => {
                log::warn!("no cue ball position to write");
                self.remove(&self.config.cue_ball_file)?;
            }
        }

        let points: Vec<WorldPoint> = object_balls.iter().filter_map(projected).collect();
        if points.is_empty() {
            self.remove(&self.config.object_balls_file)?;
        } else {
            let file = self.config.object_balls_file.clone();
            self.write(&file, &format_rows(&points))?;
        }

        let file = self.config.count_file.clone();
        self.write(&file, &format!("{}\n", points.len()))?;

        Ok(())
    }

    fn display(&mut self, overlay: &Image<u8, 3>) -> Result<(), DetectError> {
        let Some(file) = self.config.overlay_file.clone() else {
            return Ok(());
        };
        let path = self.output_path(&file)?;
        cuesight_io::functional::write_image_png_rgb8(&path, overlay)?;
        log::debug!("wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}
