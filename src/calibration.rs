//! Sensor quality check and tilt baseline.
//!
//! Two forms:
//! - **snapshot**: accept the current stability score if it is high enough
//! - **timed window**: consume the live stream for a fixed duration and
//!   judge accelerometer quality by how far its magnitude strays from 1 g
//!
//! Neither form returns an error; every failure is a result with
//! `success == false` and a message.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Serialize;

use crate::config::{AltitudeReference, CalibrationConfig};
use crate::orientation::{OrientationFilter, RawSample};
use crate::stability::{AccuracyScore, StabilityScorer};

/// Outcome of one calibration run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationResult {
    pub success: bool,
    pub accuracy: AccuracyScore,
    pub message: String,
}

impl CalibrationResult {
    fn failed(accuracy: AccuracyScore, message: impl Into<String>) -> Self {
        Self {
            success: false,
            accuracy,
            message: message.into(),
        }
    }
}

/// Running tally of accelerometer deviation from standard gravity
#[derive(Debug, Default)]
struct GravityTally {
    deviation_sum: f32,
    count: usize,
}

impl GravityTally {
    fn record(&mut self, sample: &RawSample) {
        if let Some(magnitude) = sample.acceleration_magnitude() {
            self.deviation_sum += (magnitude - 1.0).abs();
            self.count += 1;
        }
    }

    fn mean_deviation(&self) -> Option<f32> {
        (self.count > 0).then(|| self.deviation_sum / self.count as f32)
    }
}

pub struct CalibrationController {
    duration: Duration,
    min_accuracy: f32,
    deviation_scale: f32,
    snapshot_min_stability: f32,
}

impl CalibrationController {
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            duration: Duration::from_millis(config.duration_ms),
            min_accuracy: config.min_accuracy,
            deviation_scale: config.gravity_deviation_scale,
            snapshot_min_stability: config.snapshot_min_stability,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Accept or reject the scorer's current output.
    pub fn snapshot(
        &self,
        filter: &mut OrientationFilter,
        scorer: &StabilityScorer,
    ) -> CalibrationResult {
        let accuracy = scorer.current();
        if accuracy.overall <= self.snapshot_min_stability {
            log::warn!(
                "Snapshot calibration rejected: stability {:.2} <= {:.2}",
                accuracy.overall,
                self.snapshot_min_stability
            );
            return CalibrationResult::failed(
                accuracy,
                format!(
                    "Device not steady enough (stability {:.2}, need more than {:.2})",
                    accuracy.overall, self.snapshot_min_stability
                ),
            );
        }

        self.record_baseline(filter);
        CalibrationResult {
            success: true,
            accuracy,
            message: "Sensors stable".to_string(),
        }
    }

    /// Sample the live stream for the configured duration.
    ///
    /// Every received sample is also fed through `filter` and `scorer`, so
    /// the current reading keeps tracking the device while calibrating.
    /// Returns early if the source is halted (all senders dropped); the
    /// scorer is then reset so no partial window leaks into later scores.
    pub fn calibrate(
        &self,
        samples: &Receiver<RawSample>,
        filter: &mut OrientationFilter,
        scorer: &mut StabilityScorer,
    ) -> CalibrationResult {
        let deadline = Instant::now() + self.duration;
        let mut tally = GravityTally::default();
        let mut received = 0usize;

        log::info!("Calibrating for {} ms", self.duration.as_millis());

        loop {
            match samples.recv_deadline(deadline) {
                Ok(sample) => {
                    received += 1;
                    tally.record(&sample);
                    if let Some(reading) = filter.update(&sample) {
                        scorer.observe(reading.azimuth, reading.altitude);
                    }
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("Sensor source stopped during calibration");
                    scorer.reset();
                    return CalibrationResult::failed(
                        AccuracyScore::default(),
                        "Calibration cancelled: sensor source stopped",
                    );
                }
            }
        }

        let Some(deviation) = tally.mean_deviation() else {
            if received == 0 {
                log::warn!("Calibration collected no samples");
                return CalibrationResult::failed(
                    AccuracyScore::default(),
                    "No sensor samples collected",
                );
            }
            log::warn!("Calibration received {} samples without accelerometer data", received);
            return CalibrationResult::failed(
                AccuracyScore::default(),
                format!("No accelerometer data in {} samples", received),
            );
        };

        let motion = (1.0 - deviation * self.deviation_scale).clamp(0.0, 1.0);
        let accuracy = AccuracyScore {
            motion,
            orientation: scorer.current().orientation,
            overall: motion,
        };

        log::debug!(
            "Calibration: {} samples, mean |g| deviation {:.3}, accuracy {:.2}",
            tally.count,
            deviation,
            motion
        );

        if !(motion >= self.min_accuracy) {
            log::warn!(
                "Calibration failed: accuracy {:.2} below {:.2}",
                motion,
                self.min_accuracy
            );
            return CalibrationResult::failed(
                accuracy,
                format!(
                    "Low accuracy detected ({:.2}, need {:.2}); hold the device still",
                    motion, self.min_accuracy
                ),
            );
        }

        self.record_baseline(filter);
        CalibrationResult {
            success: true,
            accuracy,
            message: format!("Calibrated from {} samples", tally.count),
        }
    }

    fn record_baseline(&self, filter: &mut OrientationFilter) {
        if filter.altitude_reference() != AltitudeReference::BaselineRelative {
            return;
        }
        if let Some(altitude) = filter.last_absolute_altitude() {
            log::info!("Tilt baseline set to {:.1}°", altitude);
            filter.set_baseline(altitude);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FusionConfig, FusionMethod, StabilityConfig};
    use std::thread;

    fn controller(duration_ms: u64) -> CalibrationController {
        CalibrationController::new(&CalibrationConfig {
            duration_ms,
            ..Default::default()
        })
    }

    fn heading_filter(reference: AltitudeReference) -> OrientationFilter {
        OrientationFilter::new(&FusionConfig {
            method: FusionMethod::Heading,
            altitude_reference: reference,
            ..Default::default()
        })
    }

    fn scorer() -> StabilityScorer {
        StabilityScorer::new(&StabilityConfig::default(), FusionMethod::Heading)
    }

    fn steady(ts: u64, gravity: f32) -> RawSample {
        RawSample::new(ts)
            .with_gravity(0.0, gravity, 0.0)
            .with_attitude(90.0, 4.0, 0.0)
    }

    #[test]
    fn test_snapshot_thresholds() {
        let c = controller(10);
        let mut filter = heading_filter(AltitudeReference::Absolute);
        let mut s = scorer();

        assert!(!c.snapshot(&mut filter, &s).success);

        s.observe(10.0, 2.0);
        s.observe(10.0, 2.0);
        let result = c.snapshot(&mut filter, &s);
        assert!(result.success);
        assert_eq!(result.accuracy.overall, 1.0);
    }

    #[test]
    fn test_samples_without_accelerometer_fail() {
        let c = controller(50);
        let (tx, rx) = crossbeam_channel::unbounded();
        for ts in 0..5 {
            tx.send(RawSample::new(ts).with_attitude(90.0, 4.0, 0.0)).unwrap();
        }
        let mut filter = heading_filter(AltitudeReference::Absolute);
        let mut s = scorer();

        let result = c.calibrate(&rx, &mut filter, &mut s);
        assert!(!result.success);
        assert_eq!(result.message, "No accelerometer data in 5 samples");
        assert!(filter.current().is_some());
    }

    #[test]
    fn test_non_finite_scale_never_succeeds() {
        let c = CalibrationController::new(&CalibrationConfig {
            duration_ms: 50,
            gravity_deviation_scale: f32::NAN,
            ..Default::default()
        });
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(steady(0, 1.0)).unwrap();
        let mut filter = heading_filter(AltitudeReference::Absolute);
        let mut s = scorer();

        assert!(!c.calibrate(&rx, &mut filter, &mut s).success);
    }

    #[test]
    fn test_no_samples_fails_within_duration() {
        let c = controller(50);
        let (_tx, rx) = crossbeam_channel::unbounded::<RawSample>();
        let mut filter = heading_filter(AltitudeReference::Absolute);
        let mut s = scorer();

        let start = Instant::now();
        let result = c.calibrate(&rx, &mut filter, &mut s);
        let elapsed = start.elapsed();

        assert!(!result.success);
        assert!(result.message.contains("No sensor samples"));
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(1000), "took {:?}", elapsed);
    }

    #[test]
    fn test_steady_device_succeeds_and_sets_baseline() {
        let c = controller(100);
        let (tx, rx) = crossbeam_channel::unbounded();
        for i in 0..20 {
            tx.send(steady(i, 1.0)).unwrap();
        }
        let mut filter = heading_filter(AltitudeReference::BaselineRelative);
        let mut s = scorer();

        let result = c.calibrate(&rx, &mut filter, &mut s);
        assert!(result.success, "{}", result.message);
        assert!((result.accuracy.overall - 1.0).abs() < 1e-5);
        assert_eq!(filter.baseline(), Some(4.0));
        assert!(!s.is_empty());
        drop(tx);
    }

    #[test]
    fn test_absolute_mode_leaves_baseline_unset() {
        let c = controller(30);
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(steady(0, 1.0)).unwrap();
        let mut filter = heading_filter(AltitudeReference::Absolute);
        let mut s = scorer();

        assert!(c.calibrate(&rx, &mut filter, &mut s).success);
        assert_eq!(filter.baseline(), None);
        drop(tx);
    }

    #[test]
    fn test_shaky_accelerometer_fails() {
        let c = controller(50);
        let (tx, rx) = crossbeam_channel::unbounded();
        for i in 0..10 {
            // 0.2 g off on average: accuracy 1 - 0.2 * 5 = 0
            let g = if i % 2 == 0 { 1.2 } else { 0.8 };
            tx.send(steady(i, g)).unwrap();
        }
        let mut filter = heading_filter(AltitudeReference::BaselineRelative);
        let mut s = scorer();

        let result = c.calibrate(&rx, &mut filter, &mut s);
        assert!(!result.success);
        assert!(result.accuracy.overall < 0.7);
        assert_eq!(filter.baseline(), None);
        drop(tx);
    }

    #[test]
    fn test_halted_source_cancels_and_resets_scorer() {
        let c = controller(5_000);
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut filter = heading_filter(AltitudeReference::Absolute);
        let mut s = scorer();

        let producer = thread::spawn(move || {
            for i in 0..5 {
                tx.send(steady(i, 1.0)).unwrap();
                thread::sleep(Duration::from_millis(5));
            }
            // tx dropped here: source halted
        });

        let start = Instant::now();
        let result = c.calibrate(&rx, &mut filter, &mut s);
        producer.join().unwrap();

        assert!(!result.success);
        assert!(result.message.contains("cancelled"));
        assert!(start.elapsed() < Duration::from_millis(5_000));
        assert!(s.is_empty());
        assert_eq!(s.current(), AccuracyScore::default());
    }
}
