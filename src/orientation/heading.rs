use std::collections::VecDeque;

use nalgebra::Vector3;

use super::{FusionStrategy, Pointing, RawSample};
use crate::config::FusionConfig;
use crate::constants::VECTOR_NORM_EPSILON;
use crate::math::{arithmetic_mean, circular_mean};

/// Heading-based fusion
///
/// Azimuth comes from the best source seen so far, in order of preference:
/// 1. an absolute compass heading from a heading/location service
/// 2. the magnetometer, tilt-compensated with the platform pitch and roll
/// 3. the platform yaw, passed through
///
/// Altitude is the platform pitch, or, without attitude data, the elevation
/// of the camera axis derived from the gravity vector.
pub struct HeadingFusion {
    window: usize,
    heading: Option<f32>,
    magnetic: Option<Vector3<f32>>,
    azimuths: VecDeque<f32>,
    altitudes: VecDeque<f32>,
}

impl HeadingFusion {
    pub fn new(config: &FusionConfig) -> Self {
        let window = config.heading_window.max(1);
        Self {
            window,
            heading: None,
            magnetic: None,
            azimuths: VecDeque::with_capacity(window),
            altitudes: VecDeque::with_capacity(window),
        }
    }

    fn azimuth(&self, sample: &RawSample) -> Option<f32> {
        if let Some(heading) = self.heading {
            return Some(heading);
        }
        match (self.magnetic, sample.attitude) {
            (Some(m), Some(att)) => Some(tilt_compensated_heading(m, att.pitch, att.roll)),
            (None, Some(att)) => Some(att.yaw),
            _ => None,
        }
    }

    fn push(&mut self, azimuth: f32, altitude: f32) -> Pointing {
        if self.azimuths.len() == self.window {
            self.azimuths.pop_front();
            self.altitudes.pop_front();
        }
        self.azimuths.push_back(crate::math::normalize_azimuth(azimuth));
        self.altitudes.push_back(altitude);

        Pointing {
            azimuth: circular_mean(self.azimuths.make_contiguous()),
            altitude: arithmetic_mean(self.altitudes.make_contiguous()),
        }
    }
}

/// Compass heading corrected for device tilt, in degrees.
///
/// `pitch` and `roll` are in degrees; the field vector is in the device frame.
pub fn tilt_compensated_heading(magnetic: Vector3<f32>, pitch: f32, roll: f32) -> f32 {
    let (sp, cp) = pitch.to_radians().sin_cos();
    let (sr, cr) = roll.to_radians().sin_cos();

    let xh = magnetic.x * cp + magnetic.y * sr * sp + magnetic.z * cr * sp;
    let yh = magnetic.y * cr - magnetic.z * sr;

    yh.atan2(xh).to_degrees()
}

/// Camera elevation from a gravity vector, same convention as the
/// cross-product strategy.
fn gravity_altitude(gravity: Vector3<f32>) -> Option<f32> {
    let g = gravity.try_normalize(VECTOR_NORM_EPSILON)?;
    Some(-g.z.atan2(g.y).to_degrees())
}

impl FusionStrategy for HeadingFusion {
    fn fuse(&mut self, sample: &RawSample) -> Option<Pointing> {
        if let Some(heading) = sample.heading {
            self.heading = Some(crate::math::normalize_azimuth(heading));
        }
        if let Some(m) = sample.magnetic_vector() {
            self.magnetic = Some(m);
        }

        let altitude = match sample.attitude {
            Some(att) => Some(crate::math::finite_or_zero(att.pitch)),
            None => sample.gravity_vector().and_then(gravity_altitude),
        }?;
        let azimuth = self.azimuth(sample).map(crate::math::finite_or_zero)?;

        Some(self.push(azimuth, altitude))
    }

    fn reset(&mut self) {
        self.heading = None;
        self.magnetic = None;
        self.azimuths.clear();
        self.altitudes.clear();
    }
}
