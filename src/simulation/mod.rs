mod device;
mod measure;
mod noise;
mod sweep;

pub use device::{DevicePose, MagneticField, SimulatedChannels, device_axes, ideal_sample};
pub use measure::{ErrorStats, angle_error, measure_error_across_poses, measure_pointing};
pub use noise::{NoiseSource, SensorNoise};
pub use sweep::{SweepConfig, SyntheticHorizon, horizon_sweep};
