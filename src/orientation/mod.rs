pub mod filter;
pub mod gravity_magnetic;
pub mod heading;
pub mod reading;
pub mod sample;

pub use filter::{Fusion, OrientationFilter};
pub use gravity_magnetic::GravityMagneticFusion;
pub use heading::{HeadingFusion, tilt_compensated_heading};
pub use reading::OrientationReading;
pub use sample::{Attitude, RawSample};

/// Uncorrected camera direction produced by a fusion strategy, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointing {
    pub azimuth: f32,
    pub altitude: f32,
}

/// A way of turning raw samples into a camera direction
pub trait FusionStrategy: Send {
    /// Update internal state with one sample and return the current
    /// direction, or `None` while the required inputs are missing.
    fn fuse(&mut self, sample: &RawSample) -> Option<Pointing>;

    /// Forget all smoothing state.
    fn reset(&mut self);
}
