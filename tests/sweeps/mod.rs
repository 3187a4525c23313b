#![allow(dead_code)]

use horizonkit::config::HorizonConfig;
use horizonkit::simulation::{SensorNoise, SweepConfig, SyntheticHorizon};
use horizonkit::{CaptureProcessor, CaptureSession, MemoryStore, RawSample};

/// Low but non-zero sensor noise, reproducible
pub fn quiet_noise(seed: u64) -> SensorNoise {
    SensorNoise::default()
        .with_seed(seed)
        .with_gravity_std(0.002)
        .with_magnetic_std(0.2)
        .with_angle_std(0.05)
}

pub fn sweep_config(seed: u64) -> SweepConfig {
    SweepConfig {
        noise: quiet_noise(seed),
        ..Default::default()
    }
}

/// Skyline that dips below the horizon between ridges
pub fn dipping_horizon() -> SyntheticHorizon {
    SyntheticHorizon {
        base_degrees: 2.0,
        amplitude_degrees: 6.0,
        ridges: 3,
    }
}

/// Replay a sweep and capture one point at the end of every dwell, once
/// the filter has settled on the stop.
pub fn capture_sweep(
    config: &HorizonConfig,
    sweep: &SweepConfig,
    samples: &[RawSample],
) -> CaptureProcessor<MemoryStore> {
    let mut processor = CaptureProcessor::new(config, MemoryStore::new()).unwrap();
    processor
        .start_session(CaptureSession::new("sweep", "Synthetic sweep", 0))
        .unwrap();

    let per_stop = sweep.dwell_samples + sweep.transit_samples;
    for (i, sample) in samples.iter().enumerate() {
        processor.process_sample(sample);
        if i % per_stop == sweep.dwell_samples - 1 {
            processor.capture_point(None).unwrap();
        }
    }
    processor
}
