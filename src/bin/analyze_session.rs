use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::{Path, PathBuf};

use horizonkit::config::{FusionMethod, HorizonConfig, Resolution};
use horizonkit::sensor::{ReplaySource, SensorSource};
use horizonkit::session::{CoverageAnalyzer, Gap, HorizonPoint};
use horizonkit::stability::AccuracyLevel;
use horizonkit::{CaptureProcessor, MemoryStore};

#[derive(Parser, Debug)]
#[command(name = "analyze_session")]
#[command(about = "Summarize fusion and stability statistics of sensor recordings", long_about = None)]
struct Args {
    /// Recordings to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fusion method: cross-product, heading
    #[arg(short = 'm', long, value_enum)]
    method: Option<FusionMethod>,

    /// Azimuth bucket width for coverage (e.g., "5", "10deg")
    #[arg(short, long)]
    resolution: Option<Resolution>,

    /// Stability (0-1) a reading needs to count towards coverage
    #[arg(long, default_value_t = 0.7)]
    min_stability: f32,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileAnalysis {
    filename: String,
    sample_count: usize,
    reading_count: usize,
    stability: Option<StatsSummary>,
    altitude: Option<StatsSummary>,
    gravity_magnitude: Option<StatsSummary>,
    stable_fraction: f32,
    worst_level: Option<AccuracyLevel>,
    coverage: f32,
    gaps: Vec<Gap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FileAnalysis {
    fn failed(filename: String, error: String) -> Self {
        Self {
            filename,
            sample_count: 0,
            reading_count: 0,
            stability: None,
            altitude: None,
            gravity_magnitude: None,
            stable_fraction: 0.0,
            worst_level: None,
            coverage: 0.0,
            gaps: Vec::new(),
            error: Some(error),
        }
    }
}

fn level_rank(level: AccuracyLevel) -> u8 {
    match level {
        AccuracyLevel::Excellent => 0,
        AccuracyLevel::Good => 1,
        AccuracyLevel::Fair => 2,
        AccuracyLevel::Poor => 3,
    }
}

fn analyze_file(path: &Path, config: &HorizonConfig, min_stability: f32) -> anyhow::Result<FileAnalysis> {
    let filename = path.display().to_string();
    let mut source = ReplaySource::open(path)?;
    let mut processor = CaptureProcessor::new(config, MemoryStore::new())?;

    let mut stability_stats: Stats<f32> = Stats::new();
    let mut altitude_stats: Stats<f32> = Stats::new();
    let mut gravity_stats: Stats<f32> = Stats::new();
    let mut stable_points = Vec::new();
    let mut worst_level: Option<AccuracyLevel> = None;
    let mut sample_count = 0;

    while let Some(sample) = source.next_sample()? {
        sample_count += 1;
        if let Some(g) = sample.acceleration_magnitude() {
            gravity_stats.update(g);
        }

        let Some(reading) = processor.process_sample(&sample) else {
            continue;
        };
        stability_stats.update(reading.accuracy.overall);
        altitude_stats.update(reading.altitude);

        let level = reading.accuracy.level();
        if worst_level.is_none_or(|w| level_rank(level) > level_rank(w)) {
            worst_level = Some(level);
        }

        if reading.accuracy.overall >= min_stability {
            stable_points.push(HorizonPoint::from_reading("analysis", &reading));
        }
    }

    let analyzer = CoverageAnalyzer::new(&config.capture);
    let reading_count = stability_stats.count;
    let stable_fraction = if reading_count > 0 {
        stable_points.len() as f32 / reading_count as f32
    } else {
        0.0
    };

    Ok(FileAnalysis {
        filename,
        sample_count,
        reading_count,
        stability: StatsSummary::from_stats(&stability_stats),
        altitude: StatsSummary::from_stats(&altitude_stats),
        gravity_magnitude: StatsSummary::from_stats(&gravity_stats),
        stable_fraction,
        worst_level,
        coverage: analyzer.coverage(&stable_points),
        gaps: analyzer.gaps(&stable_points),
        error: None,
    })
}

fn print_text(results: &[FileAnalysis], config: &HorizonConfig) {
    eprintln!(
        "Fusion: {:?}, resolution {}",
        config.fusion.method, config.capture.resolution
    );
    eprintln!();

    println!(
        "{:<50} {:>8} {:>8} {:>10} {:>8} {:>10} {:>6}",
        "File", "Samples", "Readings", "Stability", "Stable%", "Coverage%", "Gaps"
    );
    println!("{}", "-".repeat(106));

    for result in results {
        if let Some(ref err) = result.error {
            println!("{:<50} ERROR: {}", result.filename, err);
            continue;
        }

        let stability = result
            .stability
            .as_ref()
            .map(|s| format!("{:.2}", s.mean))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<50} {:>8} {:>8} {:>10} {:>8.1} {:>10.1} {:>6}",
            result.filename,
            result.sample_count,
            result.reading_count,
            stability,
            result.stable_fraction * 100.0,
            result.coverage,
            result.gaps.len()
        );
    }

    for result in results {
        if result.error.is_some() {
            continue;
        }
        eprintln!();
        eprintln!("Details for {}:", result.filename);
        if let Some(ref alt) = result.altitude {
            eprintln!(
                "  Altitude:  {:.1} ± {:.1}° (range {:.1} to {:.1})",
                alt.mean, alt.std_dev, alt.min, alt.max
            );
        }
        if let Some(ref g) = result.gravity_magnitude {
            eprintln!("  |a|:       {:.3} ± {:.3} g", g.mean, g.std_dev);
        }
        if let Some(level) = result.worst_level {
            eprintln!("  Worst accuracy level: {:?}", level);
        }
        for gap in &result.gaps {
            eprintln!(
                "  Gap {:.1}° -> {:.1}° ({:.1}°)",
                gap.start, gap.end, gap.size
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

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
    config.validate()?;

    let results: Vec<FileAnalysis> = args
        .files
        .iter()
        .map(|path| {
            analyze_file(path, &config, args.min_stability).unwrap_or_else(|e| {
                FileAnalysis::failed(path.display().to_string(), format!("{:#}", e))
            })
        })
        .collect();

    match args.format {
        OutputFormat::Text => print_text(&results, &config),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
    }

    Ok(())
}
