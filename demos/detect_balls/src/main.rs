use argh::FromArgs;
use std::path::PathBuf;

use cuesight::calib::CalibrationPaths;
use cuesight::detect::{BallDetector, CsvResultSink, DetectorConfig, OutputConfig};

#[derive(FromArgs)]
/// Detect the billiard balls of an image and write their table-plane coordinates
struct Args {
    /// path to an input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// path to the comma-delimited 3x3 intrinsic matrix
    #[argh(option, short = 'k')]
    intrinsic: PathBuf,

    /// path to the comma-delimited rotation matrix
    #[argh(option, short = 'r')]
    rotation: PathBuf,

    /// path to the comma-delimited 3x1 translation vector
    #[argh(option, short = 't')]
    translation: PathBuf,

    /// path to a JSON detector configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// directory of the output files
    #[argh(option, short = 'o', default = "PathBuf::from(\".\")")]
    output_dir: PathBuf,

    /// do not write the overlay image
    #[argh(switch)]
    no_overlay: bool,

    /// print the detections as JSON instead of a summary
    #[argh(switch)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => DetectorConfig::from_json_file(path)?,
        None => DetectorConfig::default(),
    };

    let paths = CalibrationPaths {
        intrinsic: args.intrinsic,
        rotation: args.rotation,
        translation: args.translation,
    };
    let detector = BallDetector::from_files(config, &paths)?;

    let mut output = OutputConfig {
        output_dir: args.output_dir,
        ..Default::default()
    };
    if args.no_overlay {
        output.overlay_file = None;
    }
    let mut sink = CsvResultSink::new(output);

    let report = detector.run(&args.image_path, &mut sink)?;

    if args.json {
        println!("{}", report.to_record().to_json_pretty()?);
    } else {
        println!("{}", report.summary());
    }

    for path in sink.written_files() {
        log::info!("wrote {}", path.display());
    }

    Ok(())
}
