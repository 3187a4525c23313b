use nalgebra::Vector3;

use super::{FusionStrategy, Pointing, RawSample};
use crate::config::FusionConfig;
use crate::constants::VECTOR_NORM_EPSILON;

/// Gravity/magnetic cross-product fusion
///
/// Low-passes the accelerometer and magnetometer vectors, then builds the
/// local East and North axes in the device frame:
///
/// ```text
/// East  = normalize(M × G)
/// North = normalize(G × East)
/// ```
///
/// The camera looks along device -z, so its horizontal bearing is
/// `atan2(-East.z, -North.z)` and its elevation is `-atan2(G.z, G.y)`.
/// Using the camera axis instead of the screen's y axis keeps azimuth
/// defined while the phone is held upright.
pub struct GravityMagneticFusion {
    gravity_alpha: f32,
    magnetic_alpha: f32,
    gravity: Option<Vector3<f32>>,
    magnetic: Option<Vector3<f32>>,
}

impl GravityMagneticFusion {
    pub fn new(config: &FusionConfig) -> Self {
        Self {
            gravity_alpha: config.gravity_smoothing,
            magnetic_alpha: config.magnetic_smoothing,
            gravity: None,
            magnetic: None,
        }
    }

    /// Smoothed gravity vector, if any accelerometer data has arrived
    pub fn gravity(&self) -> Option<Vector3<f32>> {
        self.gravity
    }

    /// Smoothed magnetic vector, if any magnetometer data has arrived
    pub fn magnetic(&self) -> Option<Vector3<f32>> {
        self.magnetic
    }
}

fn smooth(state: Option<Vector3<f32>>, sample: Vector3<f32>, alpha: f32) -> Vector3<f32> {
    match state {
        Some(v) => v + (sample - v) * alpha,
        None => sample,
    }
}

impl FusionStrategy for GravityMagneticFusion {
    fn fuse(&mut self, sample: &RawSample) -> Option<Pointing> {
        if let Some(g) = sample.gravity_vector() {
            self.gravity = Some(smooth(self.gravity, g, self.gravity_alpha));
        }
        if let Some(m) = sample.magnetic_vector() {
            self.magnetic = Some(smooth(self.magnetic, m, self.magnetic_alpha));
        }

        let g = self.gravity?.try_normalize(VECTOR_NORM_EPSILON)?;
        let m = self.magnetic?.try_normalize(VECTOR_NORM_EPSILON)?;

        // Field parallel to gravity (magnetic pole, or a nearby magnet) has no east
        let east = m.cross(&g).try_normalize(VECTOR_NORM_EPSILON)?;
        let north = g.cross(&east).try_normalize(VECTOR_NORM_EPSILON)?;

        let altitude = -g.z.atan2(g.y).to_degrees();
        let azimuth = (-east.z).atan2(-north.z).to_degrees();

        Some(Pointing { azimuth, altitude })
    }

    fn reset(&mut self) {
        self.gravity = None;
        self.magnetic = None;
    }
}
