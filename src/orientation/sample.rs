use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::STANDARD_GRAVITY;
use crate::math::finite_or_zero;

/// Device attitude angles in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    /// Rotation about the vertical axis (raw device heading)
    pub yaw: f32,
    /// Camera elevation above the horizontal
    pub pitch: f32,
    /// Rotation about the camera axis
    pub roll: f32,
}

/// One push from the sensor source
///
/// Any subset of the channels may be present; platforms that report the
/// accelerometer and magnetometer on separate callbacks deliver them as
/// separate samples. Vectors are in the device frame (x right, y up along
/// the screen, z out of the screen; the camera looks along -z).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    /// Accelerometer reading in g, pointing away from the ground at rest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<[f32; 3]>,
    /// Magnetometer reading, any consistent unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnetic: Option<[f32; 3]>,
    /// Platform-fused yaw/pitch/roll
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attitude: Option<Attitude>,
    /// Absolute compass heading from a location/heading service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f32>,
}

impl RawSample {
    pub fn new(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            ..Default::default()
        }
    }

    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = Some([x, y, z]);
        self
    }

    /// Accelerometer reading in m/s², stored in g.
    pub fn with_acceleration_ms2(self, x: f32, y: f32, z: f32) -> Self {
        self.with_gravity(
            x / STANDARD_GRAVITY,
            y / STANDARD_GRAVITY,
            z / STANDARD_GRAVITY,
        )
    }

    pub fn with_magnetic(mut self, x: f32, y: f32, z: f32) -> Self {
        self.magnetic = Some([x, y, z]);
        self
    }

    pub fn with_attitude(mut self, yaw: f32, pitch: f32, roll: f32) -> Self {
        self.attitude = Some(Attitude { yaw, pitch, roll });
        self
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn gravity_vector(&self) -> Option<Vector3<f32>> {
        self.gravity.map(to_vector)
    }

    pub fn magnetic_vector(&self) -> Option<Vector3<f32>> {
        self.magnetic.map(to_vector)
    }

    /// Magnitude of the acceleration vector in g.
    pub fn acceleration_magnitude(&self) -> Option<f32> {
        self.gravity_vector().map(|g| g.norm())
    }

    /// True when the sample carries nothing the fusion stage can use.
    pub fn is_empty(&self) -> bool {
        self.gravity.is_none()
            && self.magnetic.is_none()
            && self.attitude.is_none()
            && self.heading.is_none()
    }
}

fn to_vector(v: [f32; 3]) -> Vector3<f32> {
    Vector3::new(finite_or_zero(v[0]), finite_or_zero(v[1]), finite_or_zero(v[2]))
}
