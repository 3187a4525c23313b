use serde::{Deserialize, Serialize};

use crate::math::{clamp_altitude, normalize_azimuth};
use crate::orientation::OrientationReading;

/// A captured horizon sample
///
/// Created by an explicit capture action and owned by exactly one session.
/// Azimuth is always in [0, 360) and altitude in [-90, 90].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonPoint {
    /// Opaque identifier, assigned by the point store when empty
    #[serde(default)]
    pub id: String,
    pub session_id: String,
    pub azimuth: f32,
    pub altitude: f32,
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    /// Overall stability (0-1) at the moment of capture
    pub accuracy: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl HorizonPoint {
    pub fn new(session_id: impl Into<String>, azimuth: f32, altitude: f32, timestamp_ms: u64) -> Self {
        Self {
            id: String::new(),
            session_id: session_id.into(),
            azimuth: normalize_azimuth(azimuth),
            altitude: clamp_altitude(altitude),
            timestamp_ms,
            accuracy: 0.0,
            notes: None,
        }
    }

    /// Capture the current reading into `session_id`.
    pub fn from_reading(session_id: impl Into<String>, reading: &OrientationReading) -> Self {
        Self::new(
            session_id,
            reading.azimuth,
            reading.altitude,
            reading.timestamp_ms,
        )
        .with_accuracy(reading.accuracy.overall)
    }

    pub fn with_accuracy(mut self, accuracy: f32) -> Self {
        self.accuracy = crate::math::finite_or_zero(accuracy).clamp(0.0, 1.0);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Re-apply the angle invariants after a field was written directly.
    pub(crate) fn normalize(&mut self) {
        self.azimuth = normalize_azimuth(self.azimuth);
        self.altitude = clamp_altitude(self.altitude);
        self.accuracy = crate::math::finite_or_zero(self.accuracy).clamp(0.0, 1.0);
    }
}

/// Partial edit of a captured point; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointUpdate {
    pub azimuth: Option<f32>,
    pub altitude: Option<f32>,
    pub notes: Option<String>,
}

impl PointUpdate {
    pub fn altitude(altitude: f32) -> Self {
        Self {
            altitude: Some(altitude),
            ..Default::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Default::default()
        }
    }

    pub fn apply(&self, point: &mut HorizonPoint) {
        if let Some(azimuth) = self.azimuth {
            point.azimuth = azimuth;
        }
        if let Some(altitude) = self.altitude {
            point.altitude = altitude;
        }
        if let Some(notes) = &self.notes {
            point.notes = Some(notes.clone());
        }
        point.normalize();
    }
}
