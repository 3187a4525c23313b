use super::{FusionStrategy, GravityMagneticFusion, HeadingFusion, OrientationReading, Pointing};
use super::RawSample;
use crate::config::{AltitudeReference, FusionConfig, FusionMethod};
use crate::math::{clamp_altitude, normalize_azimuth};

/// Selected fusion strategy
pub enum Fusion {
    CrossProduct(GravityMagneticFusion),
    Heading(HeadingFusion),
}

impl Fusion {
    pub fn new(config: &FusionConfig) -> Self {
        match config.method {
            FusionMethod::CrossProduct => Self::CrossProduct(GravityMagneticFusion::new(config)),
            FusionMethod::Heading => Self::Heading(HeadingFusion::new(config)),
        }
    }

    pub fn method(&self) -> FusionMethod {
        match self {
            Self::CrossProduct(_) => FusionMethod::CrossProduct,
            Self::Heading(_) => FusionMethod::Heading,
        }
    }
}

impl FusionStrategy for Fusion {
    fn fuse(&mut self, sample: &RawSample) -> Option<Pointing> {
        match self {
            Self::CrossProduct(f) => f.fuse(sample),
            Self::Heading(f) => f.fuse(sample),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::CrossProduct(f) => f.reset(),
            Self::Heading(f) => f.reset(),
        }
    }
}

/// Turns raw samples into azimuth/altitude readings
///
/// Wraps the selected fusion strategy and applies the azimuth correction
/// (declination plus manual offset) and the altitude reference. The tilt
/// baseline lives here: it is set by a successful calibration and cleared
/// at the end of a capture session. In [`AltitudeReference::Absolute`] mode
/// a stored baseline is kept but never subtracted.
pub struct OrientationFilter {
    fusion: Fusion,
    azimuth_correction: f32,
    reference: AltitudeReference,
    baseline: Option<f32>,
    last_absolute_altitude: Option<f32>,
    current: Option<OrientationReading>,
}

impl OrientationFilter {
    pub fn new(config: &FusionConfig) -> Self {
        Self {
            fusion: Fusion::new(config),
            azimuth_correction: crate::math::finite_or_zero(
                config.declination_degrees + config.azimuth_offset_degrees,
            ),
            reference: config.altitude_reference,
            baseline: None,
            last_absolute_altitude: None,
            current: None,
        }
    }

    /// Feed one sample; returns a reading once the strategy has enough state.
    pub fn update(&mut self, sample: &RawSample) -> Option<OrientationReading> {
        let pointing = self.fusion.fuse(sample)?;

        let azimuth = normalize_azimuth(pointing.azimuth + self.azimuth_correction);
        let absolute = clamp_altitude(pointing.altitude);
        self.last_absolute_altitude = Some(absolute);

        let altitude = self.reported_altitude(absolute);

        let reading = OrientationReading::new(azimuth, altitude, sample.timestamp_ms);
        self.current = Some(reading);
        Some(reading)
    }

    /// Latest reading, unscored
    pub fn current(&self) -> Option<OrientationReading> {
        self.current
    }

    pub fn method(&self) -> FusionMethod {
        self.fusion.method()
    }

    pub fn altitude_reference(&self) -> AltitudeReference {
        self.reference
    }

    /// Record a tilt baseline to subtract in baseline-relative mode.
    ///
    /// The current reading is re-expressed against the new baseline.
    pub fn set_baseline(&mut self, altitude: f32) {
        self.baseline = Some(clamp_altitude(altitude));
        self.refresh_current();
    }

    pub fn clear_baseline(&mut self) {
        self.baseline = None;
        self.refresh_current();
    }

    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    /// Altitude of the latest reading before any baseline was applied
    pub fn last_absolute_altitude(&self) -> Option<f32> {
        self.last_absolute_altitude
    }

    fn reported_altitude(&self, absolute: f32) -> f32 {
        match (self.reference, self.baseline) {
            (AltitudeReference::BaselineRelative, Some(baseline)) => {
                clamp_altitude(absolute - baseline)
            }
            _ => absolute,
        }
    }

    fn refresh_current(&mut self) {
        let Some(absolute) = self.last_absolute_altitude else {
            return;
        };
        let altitude = self.reported_altitude(absolute);
        if let Some(current) = self.current.as_mut() {
            current.altitude = altitude;
        }
    }

    /// Drop smoothing state; the baseline is kept.
    pub fn reset(&mut self) {
        self.fusion.reset();
        self.last_absolute_altitude = None;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading_filter(reference: AltitudeReference) -> OrientationFilter {
        OrientationFilter::new(&FusionConfig {
            method: FusionMethod::Heading,
            altitude_reference: reference,
            ..Default::default()
        })
    }

    #[test]
    fn test_selects_strategy() {
        let f = OrientationFilter::new(&FusionConfig::default());
        assert_eq!(f.method(), FusionMethod::CrossProduct);
        assert_eq!(
            heading_filter(AltitudeReference::Absolute).method(),
            FusionMethod::Heading
        );
    }

    #[test]
    fn test_declination_and_offset_applied() {
        let mut f = OrientationFilter::new(&FusionConfig {
            method: FusionMethod::Heading,
            declination_degrees: 8.0,
            azimuth_offset_degrees: -2.0,
            ..Default::default()
        });
        let r = f
            .update(&RawSample::new(0).with_attitude(358.0, 0.0, 0.0))
            .unwrap();
        assert!((r.azimuth - 4.0).abs() < 1e-3, "azimuth {}", r.azimuth);
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        let mut f = heading_filter(AltitudeReference::Absolute);
        let r = f
            .update(&RawSample::new(0).with_attitude(f32::NAN, 140.0, 0.0))
            .unwrap();
        assert_eq!(r.azimuth, 0.0);
        assert_eq!(r.altitude, 90.0);
    }

    #[test]
    fn test_baseline_relative_subtracts_baseline() {
        let mut f = heading_filter(AltitudeReference::BaselineRelative);
        f.set_baseline(5.0);
        let r = f
            .update(&RawSample::new(0).with_attitude(0.0, 12.0, 0.0))
            .unwrap();
        assert!((r.altitude - 7.0).abs() < 1e-4);
        assert_eq!(f.last_absolute_altitude(), Some(12.0));

        f.clear_baseline();
        let r = f
            .update(&RawSample::new(1).with_attitude(0.0, 12.0, 0.0))
            .unwrap();
        assert!((r.altitude - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_baseline_applies_to_current_reading() {
        let mut f = heading_filter(AltitudeReference::BaselineRelative);
        f.update(&RawSample::new(0).with_attitude(0.0, 12.0, 0.0));

        f.set_baseline(12.0);
        assert!(f.current().unwrap().altitude.abs() < 1e-4);

        f.clear_baseline();
        assert!((f.current().unwrap().altitude - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_absolute_mode_ignores_baseline() {
        let mut f = heading_filter(AltitudeReference::Absolute);
        f.set_baseline(5.0);
        let r = f
            .update(&RawSample::new(0).with_attitude(0.0, 12.0, 0.0))
            .unwrap();
        assert!((r.altitude - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_no_reading_without_data() {
        let mut f = OrientationFilter::new(&FusionConfig::default());
        assert!(f.update(&RawSample::new(0)).is_none());
        assert!(f.last_absolute_altitude().is_none());
        assert!(f.current().is_none());
    }
}
