use crate::config::FusionConfig;
use crate::orientation::{OrientationFilter, OrientationReading, RawSample};

use super::{DevicePose, MagneticField, NoiseSource, SensorNoise, SimulatedChannels, ideal_sample};

/// Signed azimuth difference in (-180, 180]
pub fn angle_error(measured: f32, expected: f32) -> f32 {
    let mut e = measured - expected;
    if e > 180.0 {
        e -= 360.0;
    } else if e <= -180.0 {
        e += 360.0;
    }
    e
}

/// Final reading after running a fresh filter over `samples`.
pub fn measure_pointing(samples: &[RawSample], config: &FusionConfig) -> Option<OrientationReading> {
    let mut filter = OrientationFilter::new(config);
    samples
        .iter()
        .filter_map(|s| filter.update(s))
        .last()
}

#[derive(Debug, Clone, Default)]
pub struct ErrorStats {
    pub max_azimuth_error: f32,
    pub max_altitude_error: f32,
    /// Poses for which no reading came out at all
    pub missing: usize,
}

/// Hold the device at each pose for `samples_per_pose` samples and record
/// the worst azimuth and altitude error over all poses.
pub fn measure_error_across_poses(
    poses: &[DevicePose],
    field: &MagneticField,
    channels: SimulatedChannels,
    noise: &SensorNoise,
    fusion: &FusionConfig,
    samples_per_pose: usize,
) -> ErrorStats {
    let mut source = NoiseSource::new(noise);
    let mut stats = ErrorStats::default();

    for &pose in poses {
        let samples: Vec<RawSample> = (0..samples_per_pose)
            .map(|i| source.apply(&ideal_sample(pose, field, channels, i as u64 * 100)))
            .collect();

        match measure_pointing(&samples, fusion) {
            Some(reading) => {
                let az = angle_error(reading.azimuth, pose.azimuth).abs();
                let alt = (reading.altitude - pose.altitude).abs();
                stats.max_azimuth_error = stats.max_azimuth_error.max(az);
                stats.max_altitude_error = stats.max_altitude_error.max(alt);
            }
            None => stats.missing += 1,
        }
    }

    stats
}
