use super::{DevicePose, MagneticField, NoiseSource, SensorNoise, SimulatedChannels, ideal_sample};
use crate::orientation::RawSample;

/// Made-up skyline: a base altitude plus a few sinusoidal ridges
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(default)]
pub struct SyntheticHorizon {
    pub base_degrees: f32,
    pub amplitude_degrees: f32,
    /// Number of ridges around the circle
    pub ridges: u32,
}

impl Default for SyntheticHorizon {
    fn default() -> Self {
        Self {
            base_degrees: 8.0,
            amplitude_degrees: 6.0,
            ridges: 3,
        }
    }
}

impl SyntheticHorizon {
    pub fn altitude_at(&self, azimuth: f32) -> f32 {
        let phase = (azimuth * self.ridges as f32).to_radians();
        self.base_degrees + self.amplitude_degrees * phase.sin()
    }
}

/// A full-circle pan that stops at regular azimuths along the skyline
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub start_time_ms: u64,
    pub sample_interval_ms: u64,
    /// Azimuth step between stops
    pub step_degrees: f32,
    /// Samples recorded while held still at each stop
    pub dwell_samples: usize,
    /// Samples recorded while moving to the next stop
    pub transit_samples: usize,
    pub field: MagneticField,
    pub channels: SimulatedChannels,
    pub noise: SensorNoise,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_time_ms: 0,
            sample_interval_ms: 100,
            step_degrees: 5.0,
            dwell_samples: 15,
            transit_samples: 3,
            field: MagneticField::default(),
            channels: SimulatedChannels::default(),
            noise: SensorNoise::default(),
        }
    }
}

/// Generate the samples of a full pan along `horizon`.
pub fn horizon_sweep(config: &SweepConfig, horizon: &SyntheticHorizon) -> Vec<RawSample> {
    let mut noise = NoiseSource::new(&config.noise);
    let step = config.step_degrees.clamp(0.1, 360.0);
    let stops = (360.0 / step).ceil() as usize;

    let mut samples = Vec::with_capacity(stops * (config.dwell_samples + config.transit_samples));
    let mut timestamp = config.start_time_ms;
    let mut emit = |pose: DevicePose, samples: &mut Vec<RawSample>| {
        let ideal = ideal_sample(pose, &config.field, config.channels, timestamp);
        samples.push(noise.apply(&ideal));
        timestamp += config.sample_interval_ms;
    };

    for stop in 0..stops {
        let azimuth = stop as f32 * step;
        let pose = DevicePose::new(azimuth, horizon.altitude_at(azimuth));
        for _ in 0..config.dwell_samples {
            emit(pose, &mut samples);
        }

        for t in 1..=config.transit_samples {
            let frac = t as f32 / (config.transit_samples + 1) as f32;
            let az = azimuth + step * frac;
            emit(DevicePose::new(az, horizon.altitude_at(az)), &mut samples);
        }
    }

    samples
}
