//! Reading-to-reading stability scoring.

use serde::{Deserialize, Serialize};

use crate::config::{FusionMethod, StabilityConfig};
use crate::math::{circular_distance, finite_or_zero};

/// Stability facets, each in 0-1 (1 = perfectly still)
///
/// Only orientation deltas are observable, so all three facets carry the
/// same value; they are kept separate for consumers that display them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyScore {
    pub motion: f32,
    pub orientation: f32,
    pub overall: f32,
}

impl AccuracyScore {
    pub fn uniform(value: f32) -> Self {
        let value = finite_or_zero(value).clamp(0.0, 1.0);
        Self {
            motion: value,
            orientation: value,
            overall: value,
        }
    }

    pub fn level(&self) -> AccuracyLevel {
        AccuracyLevel::from_stability(self.overall)
    }
}

/// Coarse accuracy classification for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AccuracyLevel {
    /// Classify by the angular error implied by a stability score.
    pub fn from_stability(stability: f32) -> Self {
        let error = estimated_error_degrees(stability);
        if error <= 1.0 {
            Self::Excellent
        } else if error <= 3.0 {
            Self::Good
        } else if error <= 5.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Angular error estimate in degrees: 10° when unstable, 0.5° when still.
pub fn estimated_error_degrees(stability: f32) -> f32 {
    let s = finite_or_zero(stability).clamp(0.0, 1.0);
    10.0 - s * 9.5
}

/// Fixed-capacity ring of per-reading deltas
///
/// Circular buffer like a moving average window, but reports the mean of
/// only the slots written so far.
struct DeltaRing {
    buffer: Vec<f32>,
    index: usize,
    filled: bool,
}

impl DeltaRing {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            index: 0,
            filled: false,
        }
    }

    fn push(&mut self, value: f32) {
        self.buffer[self.index] = value;
        self.index = (self.index + 1) % self.buffer.len();
        if self.index == 0 {
            self.filled = true;
        }
    }

    fn len(&self) -> usize {
        if self.filled {
            self.buffer.len()
        } else {
            self.index
        }
    }

    fn average(&self) -> f32 {
        let len = self.len();
        if len == 0 {
            return 0.0;
        }
        let sum: f32 = if self.filled {
            self.buffer.iter().sum()
        } else {
            self.buffer[..len].iter().sum()
        };
        sum / len as f32
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
        self.filled = false;
    }
}

/// Scores consecutive readings by how much they moved
///
/// Each step contributes `dAz + dAlt` (azimuth distance taken around the
/// circle). The score is `clamp(1 - mean(deltas) / K, 0, 1)`.
pub struct StabilityScorer {
    deltas: DeltaRing,
    sensitivity: f32,
    previous: Option<(f32, f32)>,
    current: AccuracyScore,
}

impl StabilityScorer {
    /// # Arguments
    /// * `config` - Buffer size and optional sensitivity override
    /// * `method` - Fusion method, selects the default sensitivity
    pub fn new(config: &StabilityConfig, method: FusionMethod) -> Self {
        Self::with_sensitivity(config.buffer_size, config.sensitivity_for(method))
    }

    pub fn with_sensitivity(buffer_size: usize, sensitivity: f32) -> Self {
        Self {
            deltas: DeltaRing::new(buffer_size),
            sensitivity,
            previous: None,
            current: AccuracyScore::default(),
        }
    }

    /// Record a reading and return the updated score.
    ///
    /// The first reading after construction or reset only seeds the state
    /// and scores zero.
    pub fn observe(&mut self, azimuth: f32, altitude: f32) -> AccuracyScore {
        let azimuth = finite_or_zero(azimuth);
        let altitude = finite_or_zero(altitude);

        if let Some((prev_az, prev_alt)) = self.previous {
            let d_az = circular_distance(azimuth, prev_az);
            let d_alt = (altitude - prev_alt).abs();
            self.deltas.push(d_az + d_alt);

            let stability = 1.0 - self.deltas.average() / self.sensitivity;
            self.current = AccuracyScore::uniform(stability);
        }

        self.previous = Some((azimuth, altitude));
        self.current
    }

    /// Latest score without observing anything new
    pub fn current(&self) -> AccuracyScore {
        self.current
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Number of deltas currently averaged
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.len() == 0
    }

    /// Return to the freshly constructed state.
    pub fn reset(&mut self) {
        self.deltas.reset();
        self.previous = None;
        self.current = AccuracyScore::default();
    }
}
