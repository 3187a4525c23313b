use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use horizonkit::config::{CoordinateFormat, FillPolicy, FusionMethod, HorizonConfig, Resolution};
use horizonkit::export::{ExportFormat, ExportSink, ExportedFile};
use horizonkit::sensor::{ReplaySource, SensorSource};
use horizonkit::{CaptureProcessor, CaptureSession, MemoryStore};

#[derive(Parser, Debug)]
#[command(name = "horizonkit")]
#[command(about = "Build a horizon obstruction profile from a recorded sensor stream", long_about = None)]
struct Args {
    /// Recording to replay (one JSON sample per line)
    recording: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Export format: hzn, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "hzn")]
    format: ExportFormat,

    /// Write the export here instead of stdout; a directory receives the
    /// suggested file name
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fusion method: cross-product, heading
    #[arg(short = 'm', long, value_enum)]
    method: Option<FusionMethod>,

    /// Azimuth bucket width (e.g., "5", "10deg")
    #[arg(short, long)]
    resolution: Option<Resolution>,

    /// Gap filling: carry-forward, nearest-neighbor
    #[arg(long, value_enum)]
    fill: Option<FillPolicy>,

    /// Magnetic declination in degrees, added to every azimuth
    #[arg(long, allow_hyphen_values = true)]
    declination: Option<f32>,

    /// Tabular delimiter: ',' or ';'
    #[arg(long)]
    delimiter: Option<char>,

    /// Add a timestamp column to tabular output
    #[arg(long)]
    timestamp: bool,

    /// Tabular coordinate notation: decimal, sexagesimal
    #[arg(long, value_enum)]
    coordinates: Option<CoordinateFormat>,

    /// Minimum stability (0-1) before a reading is captured
    #[arg(long, default_value_t = 0.7)]
    min_stability: f32,

    /// Run a snapshot calibration at the first stable reading
    #[arg(long)]
    calibrate: bool,

    /// Session name stored with the export
    #[arg(long, default_value = "Replay")]
    session_name: String,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct StdoutSink;

impl ExportSink for StdoutSink {
    fn deliver(&mut self, file: &ExportedFile) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(file.content.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

struct FileSink {
    path: PathBuf,
}

impl ExportSink for FileSink {
    fn deliver(&mut self, file: &ExportedFile) -> Result<()> {
        let path = if self.path.is_dir() {
            self.path.join(&file.filename)
        } else {
            self.path.clone()
        };
        fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
        Ok(())
    }
}

fn build_config(args: &Args) -> Result<HorizonConfig> {
    let mut config = match &args.config {
        Some(path) => HorizonConfig::load(path)?,
        None => HorizonConfig::default(),
    };

    if let Some(method) = args.method {
        config.fusion.method = method;
    }
    if let Some(resolution) = args.resolution {
        config.capture.resolution = resolution;
    }
    if let Some(fill) = args.fill {
        config.export.fill_policy = fill;
    }
    if let Some(declination) = args.declination {
        config.fusion.declination_degrees = declination;
    }
    if let Some(delimiter) = args.delimiter {
        config.export.delimiter = delimiter;
    }
    if let Some(coordinates) = args.coordinates {
        config.export.coordinate_format = coordinates;
    }
    config.export.include_timestamp |= args.timestamp;

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;
    let resolution = config.capture.resolution;
    let mut source = ReplaySource::open(&args.recording)
        .with_context(|| format!("Failed to load {}", args.recording.display()))?;

    let mut processor = CaptureProcessor::new(&config, MemoryStore::new())?;
    processor.start_session(CaptureSession::new(
        "replay",
        args.session_name.clone(),
        horizonkit::export::timestamp_millis(),
    ))?;

    let mut captured = HashSet::new();
    let mut calibrated = !args.calibrate;
    let mut last_timestamp = 0;

    while let Some(sample) = source.next_sample()? {
        last_timestamp = sample.timestamp_ms;
        let Some(reading) = processor.process_sample(&sample) else {
            continue;
        };
        if reading.accuracy.overall < args.min_stability {
            continue;
        }

        if !calibrated {
            let result = processor.calibrate_snapshot();
            eprintln!("Calibration: {}", result.message);
            calibrated = result.success;
            continue;
        }

        if captured.insert(resolution.bucket_of(reading.azimuth)) {
            let point = processor.capture_point(None)?;
            log::debug!(
                "Captured {} at {:.1}° / {:.1}° (accuracy {:.2})",
                point.id,
                point.azimuth,
                point.altitude,
                point.accuracy
            );
        }
    }

    if !processor.sensors_available() {
        log::warn!(
            "Recording never provided the sensors {:?} fusion needs",
            config.fusion.method
        );
    }

    let stats = processor.statistics();
    eprintln!(
        "Captured {} points, {:.1}% coverage ({:?})",
        stats.total_points,
        stats.coverage,
        processor.status()
    );
    for gap in processor.gaps() {
        eprintln!(
            "  Gap {:.1}° -> {:.1}° ({:.1}°)",
            gap.start, gap.end, gap.size
        );
    }

    let file = processor.export(args.format)?;
    let mut sink: Box<dyn ExportSink> = match &args.output {
        Some(path) => Box::new(FileSink { path: path.clone() }),
        None => Box::new(StdoutSink),
    };
    sink.deliver(&file)?;

    processor.end_session(last_timestamp)?;
    Ok(())
}
