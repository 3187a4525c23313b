use nalgebra::Vector3;

use crate::orientation::RawSample;

/// Where the simulated camera points, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePose {
    pub azimuth: f32,
    pub altitude: f32,
}

impl DevicePose {
    pub fn new(azimuth: f32, altitude: f32) -> Self {
        Self { azimuth, altitude }
    }
}

/// Local geomagnetic field
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(default)]
pub struct MagneticField {
    /// Dip below the horizontal, positive in the northern hemisphere
    pub inclination_degrees: f32,
    /// Total intensity in µT
    pub strength: f32,
}

impl Default for MagneticField {
    fn default() -> Self {
        Self {
            inclination_degrees: 60.0,
            strength: 50.0,
        }
    }
}

impl MagneticField {
    /// Field vector in east/north/up coordinates
    pub fn world_vector(&self) -> Vector3<f32> {
        let (si, ci) = self.inclination_degrees.to_radians().sin_cos();
        Vector3::new(0.0, ci, -si) * self.strength
    }
}

/// Channels the simulated platform reports
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(default)]
pub struct SimulatedChannels {
    /// Raw accelerometer and magnetometer vectors
    pub vectors: bool,
    /// Platform yaw/pitch/roll
    pub attitude: bool,
    /// Absolute compass heading
    pub heading: bool,
}

impl Default for SimulatedChannels {
    fn default() -> Self {
        Self {
            vectors: true,
            attitude: false,
            heading: false,
        }
    }
}

/// Device axes expressed in east/north/up for a held-upright phone with no
/// roll: x to the right of the screen, y up the screen, z out of the
/// screen towards the user. The camera looks along -z.
pub fn device_axes(pose: DevicePose) -> [Vector3<f32>; 3] {
    let (sa, ca) = pose.azimuth.to_radians().sin_cos();
    let (sl, cl) = pose.altitude.to_radians().sin_cos();

    let z = -Vector3::new(sa * cl, ca * cl, sl);
    let y = Vector3::new(-sa * sl, -ca * sl, cl);
    let x = y.cross(&z);
    [x, y, z]
}

fn to_device(world: Vector3<f32>, axes: &[Vector3<f32>; 3]) -> [f32; 3] {
    [world.dot(&axes[0]), world.dot(&axes[1]), world.dot(&axes[2])]
}

/// Noise-free sample for a pose.
pub fn ideal_sample(
    pose: DevicePose,
    field: &MagneticField,
    channels: SimulatedChannels,
    timestamp_ms: u64,
) -> RawSample {
    let axes = device_axes(pose);
    let mut sample = RawSample::new(timestamp_ms);

    if channels.vectors {
        let [gx, gy, gz] = to_device(Vector3::z(), &axes);
        let [mx, my, mz] = to_device(field.world_vector(), &axes);
        sample = sample.with_gravity(gx, gy, gz).with_magnetic(mx, my, mz);
    }
    if channels.attitude {
        sample = sample.with_attitude(pose.azimuth, pose.altitude, 0.0);
    }
    if channels.heading {
        sample = sample.with_heading(pose.azimuth);
    }
    sample
}
