use serde::Serialize;

use crate::stability::AccuracyScore;

/// Current azimuth/altitude estimate
///
/// Exactly one current reading exists at a time; each sample that yields a
/// reading replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrientationReading {
    /// Compass bearing of the camera axis in degrees (0-360, 0 = north)
    pub azimuth: f32,
    /// Camera elevation in degrees (-90 to 90)
    pub altitude: f32,
    /// Stability annotation, zero until scored
    pub accuracy: AccuracyScore,
    /// Timestamp of the sample that produced this reading
    pub timestamp_ms: u64,
}

impl OrientationReading {
    pub fn new(azimuth: f32, altitude: f32, timestamp_ms: u64) -> Self {
        Self {
            azimuth,
            altitude,
            accuracy: AccuracyScore::default(),
            timestamp_ms,
        }
    }

    pub fn with_accuracy(mut self, accuracy: AccuracyScore) -> Self {
        self.accuracy = accuracy;
        self
    }
}
