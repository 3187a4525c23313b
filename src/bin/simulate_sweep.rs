use anyhow::{Context, Result};
use clap::Parser;
use horizonkit::sensor::write_recording;
use horizonkit::simulation::{SensorNoise, SweepConfig, SyntheticHorizon, horizon_sweep};
use serde::Deserialize;
use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "simulate_sweep")]
#[command(about = "Generate synthetic sensor recordings of a full horizon pan")]
struct Args {
    /// TOML sweep configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output recording (JSON lines)
    #[arg(short, long, default_value = "data/synthetic/sweep.jsonl")]
    output: PathBuf,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Azimuth step between stops in degrees
    #[arg(long)]
    step: Option<f32>,

    /// Samples held at each stop
    #[arg(long)]
    dwell: Option<usize>,

    /// Accelerometer noise in g (CLI override)
    #[arg(long)]
    gravity_noise: Option<f32>,

    /// Magnetometer noise in µT (CLI override)
    #[arg(long)]
    magnetic_noise: Option<f32>,

    /// Attitude noise in degrees (CLI override)
    #[arg(long)]
    angle_noise: Option<f32>,

    /// Also emit platform yaw/pitch/roll
    #[arg(long)]
    attitude: bool,

    /// Also emit an absolute compass heading
    #[arg(long)]
    heading: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TomlConfig {
    sweep: Option<SweepConfig>,
    horizon: Option<SyntheticHorizon>,
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_sweep_config(toml: &TomlConfig, args: &Args) -> SweepConfig {
    let mut config = toml.sweep.clone().unwrap_or_default();

    if let Some(step) = args.step {
        config.step_degrees = step;
    }
    if let Some(dwell) = args.dwell {
        config.dwell_samples = dwell;
    }

    let noise: &mut SensorNoise = &mut config.noise;
    if let Some(seed) = args.seed {
        noise.seed = Some(seed);
    }
    if let Some(std) = args.gravity_noise {
        noise.gravity_std = std;
    }
    if let Some(std) = args.magnetic_noise {
        noise.magnetic_std = std;
    }
    if let Some(std) = args.angle_noise {
        noise.angle_std_degrees = std;
    }

    config.channels.attitude |= args.attitude;
    config.channels.heading |= args.heading;
    config
}

fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        TomlConfig::default()
    };

    let sweep = build_sweep_config(&toml_config, &args);
    let horizon = toml_config.horizon.unwrap_or_default();
    let samples = horizon_sweep(&sweep, &horizon);

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context("Failed to create output directory")?;
    }
    let file = fs::File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    write_recording(BufWriter::new(file), &samples)?;

    eprintln!(
        "Generated {} samples ({}° steps, seed {:?}) in {}",
        samples.len(),
        sweep.step_degrees,
        sweep.noise.seed,
        args.output.display()
    );
    Ok(())
}
