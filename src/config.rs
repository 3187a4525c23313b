//! Configuration for the horizon capture engine.
//!
//! Every section has a `Default` carrying the field-tested constants, and
//! every section deserializes with `#[serde(default)]`, so a TOML file only
//! needs to name what it overrides:
//!
//! ```toml
//! [fusion]
//! method = "heading"
//! declination_degrees = 1.5
//!
//! [capture]
//! resolution = 10
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ExportError, HorizonError, Result};

/// Azimuth bucket width in whole degrees
///
/// Must divide 360 so that buckets tile the circle exactly.
///
/// # Parsing formats
/// - `5` - degrees (no suffix)
/// - `5deg` or `5°` - degrees (explicit)
///
/// # Example
/// ```
/// use horizonkit::config::Resolution;
///
/// let res: Resolution = "10deg".parse().unwrap();
/// assert_eq!(res.buckets(), 36);
/// assert!("7".parse::<Resolution>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u32")]
pub struct Resolution(u32);

impl Resolution {
    /// One bucket per integer degree
    pub const WHOLE_DEGREE: Resolution = Resolution(1);

    pub fn new(degrees: u32) -> std::result::Result<Self, ExportError> {
        if degrees == 0 || 360 % degrees != 0 {
            return Err(ExportError::Resolution(degrees));
        }
        Ok(Self(degrees))
    }

    /// Bucket width in degrees
    pub fn degrees(&self) -> u32 {
        self.0
    }

    /// Number of buckets around the circle
    pub fn buckets(&self) -> usize {
        (360 / self.0) as usize
    }

    /// Bucket index for an azimuth, rounding to the nearest bucket center
    /// and wrapping the last half-bucket back onto north.
    pub fn bucket_of(&self, azimuth: f32) -> usize {
        let azimuth = crate::math::normalize_azimuth(azimuth);
        let index = (azimuth / self.0 as f32).round() as usize;
        index % self.buckets()
    }

    /// Azimuth of a bucket center
    pub fn center_of(&self, bucket: usize) -> f32 {
        (bucket as u32 * self.0) as f32
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u32> for Resolution {
    type Error = ExportError;

    fn try_from(degrees: u32) -> std::result::Result<Self, Self::Error> {
        Self::new(degrees)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}deg", self.0)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let num = s
            .strip_suffix("deg")
            .or_else(|| s.strip_suffix('°'))
            .unwrap_or(s);

        let degrees: u32 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid resolution: {}", s))?;
        Self::new(degrees).map_err(|e| e.to_string())
    }
}

/// Orientation fusion strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FusionMethod {
    /// Smoothed gravity and magnetic vectors combined via cross products
    CrossProduct,
    /// Absolute heading, tilt-compensated compass, or raw yaw passthrough
    Heading,
}

/// How altitude relates to the calibration tilt baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AltitudeReference {
    /// Altitude as measured against gravity; the baseline is never applied
    Absolute,
    /// Altitude minus the tilt recorded by the last successful calibration
    BaselineRelative,
}

/// Gap-filling policy for building a full profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FillPolicy {
    /// Whole-degree profile; minimum altitude per degree, gaps carried forward
    CarryForward,
    /// One entry per resolution bucket taken from the nearest captured point
    NearestNeighbor,
}

/// Coordinate notation in tabular exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateFormat {
    /// `123.4`
    Decimal,
    /// `123°24'00.0"`
    Sexagesimal,
}

/// Complete engine configuration
///
/// # Example
/// ```
/// use horizonkit::config::{FusionMethod, HorizonConfig};
///
/// let config = HorizonConfig::from_toml_str("[fusion]\nmethod = \"heading\"\n").unwrap();
/// assert_eq!(config.fusion.method, FusionMethod::Heading);
/// assert_eq!(config.capture.resolution.degrees(), 5);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    /// Orientation fusion
    pub fusion: FusionConfig,
    /// Stability scoring
    pub stability: StabilityConfig,
    /// Calibration procedure
    pub calibration: CalibrationConfig,
    /// Coverage and completion
    pub capture: CaptureConfig,
    /// Profile building and serialization
    pub export: ExportConfig,
}

/// Orientation fusion configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Strategy used to turn samples into azimuth/altitude
    pub method: FusionMethod,
    /// Exponential smoothing factor for the gravity vector (0-1, higher follows faster)
    pub gravity_smoothing: f32,
    /// Exponential smoothing factor for the magnetic vector (0-1)
    pub magnetic_smoothing: f32,
    /// Heading strategy: number of readings averaged (1 disables smoothing)
    pub heading_window: usize,
    /// Magnetic declination added to every azimuth
    pub declination_degrees: f32,
    /// Manual correction when 0° does not line up with north
    pub azimuth_offset_degrees: f32,
    /// Absolute or baseline-relative altitude
    pub altitude_reference: AltitudeReference,
}

/// Stability scoring configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Number of reading-to-reading deltas averaged
    pub buffer_size: usize,
    /// Average delta (degrees per reading) at which stability reaches 0.
    /// `None` picks the default for the fusion method in use.
    pub sensitivity: Option<f32>,
}

/// Calibration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Length of the timed sampling window in milliseconds
    pub duration_ms: u64,
    /// Minimum accuracy (0-1) for a timed calibration to succeed
    pub min_accuracy: f32,
    /// Accuracy lost per g of average deviation from standard gravity
    pub gravity_deviation_scale: f32,
    /// Stability (0-1) a snapshot calibration must exceed
    pub snapshot_min_stability: f32,
}

/// Coverage and completion configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Azimuth bucket width, fixed for the lifetime of a session
    pub resolution: Resolution,
    /// Coverage percentage at which a session counts as complete
    pub complete_threshold: f32,
    /// Coverage percentage for the softer "almost there" signal
    pub progress_threshold: f32,
    /// Azimuth gaps wider than this are reported
    pub gap_threshold_degrees: f32,
    /// Fewer points than this triggers a warning on export
    pub min_points: usize,
}

/// Export configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// How gaps are filled when building the profile
    pub fill_policy: FillPolicy,
    /// Tabular field delimiter, `,` or `;`
    pub delimiter: char,
    /// Add a timestamp column to tabular exports
    pub include_timestamp: bool,
    /// Decimal or sexagesimal coordinates in tabular exports
    pub coordinate_format: CoordinateFormat,
    /// Suggested file name (without extension) handed to the sink
    pub filename: String,
}

impl HorizonConfig {
    /// Parse a (possibly partial) TOML document and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| HorizonError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HorizonError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject combinations that would make scoring or export meaningless.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f32| -> Result<()> {
            if !(v > 0.0 && v <= 1.0) {
                return Err(HorizonError::Config(format!(
                    "{} must be in (0, 1], got {}",
                    name, v
                )));
            }
            Ok(())
        };
        unit("fusion.gravity_smoothing", self.fusion.gravity_smoothing)?;
        unit("fusion.magnetic_smoothing", self.fusion.magnetic_smoothing)?;
        unit("calibration.min_accuracy", self.calibration.min_accuracy)?;

        let scale = self.calibration.gravity_deviation_scale;
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(HorizonError::Config(format!(
                "calibration.gravity_deviation_scale must be positive, got {}",
                scale
            )));
        }
        if !(0.0..=1.0).contains(&self.calibration.snapshot_min_stability) {
            return Err(HorizonError::Config(format!(
                "calibration.snapshot_min_stability must be in [0, 1], got {}",
                self.calibration.snapshot_min_stability
            )));
        }

        if self.fusion.heading_window == 0 {
            return Err(HorizonError::Config(
                "fusion.heading_window must be at least 1".to_string(),
            ));
        }
        if self.stability.buffer_size == 0 {
            return Err(HorizonError::Config(
                "stability.buffer_size must be at least 1".to_string(),
            ));
        }
        if let Some(k) = self.stability.sensitivity {
            if !(k > 0.0 && k.is_finite()) {
                return Err(HorizonError::Config(format!(
                    "stability.sensitivity must be positive, got {}",
                    k
                )));
            }
        }
        for (name, pct) in [
            ("capture.complete_threshold", self.capture.complete_threshold),
            ("capture.progress_threshold", self.capture.progress_threshold),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(HorizonError::Config(format!(
                    "{} must be a percentage, got {}",
                    name, pct
                )));
            }
        }
        if !(self.capture.gap_threshold_degrees >= 0.0) {
            return Err(HorizonError::Config(
                "capture.gap_threshold_degrees must not be negative".to_string(),
            ));
        }
        if !matches!(self.export.delimiter, ',' | ';') {
            return Err(ExportError::Delimiter(self.export.delimiter).into());
        }
        Ok(())
    }
}

impl StabilityConfig {
    /// Sensitivity constant for the given fusion method.
    ///
    /// Cross-product fusion has a tighter noise floor than raw heading
    /// sources, so it saturates at a smaller average delta.
    pub fn sensitivity_for(&self, method: FusionMethod) -> f32 {
        self.sensitivity.unwrap_or(match method {
            FusionMethod::CrossProduct => 5.0,
            FusionMethod::Heading => 30.0,
        })
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            method: FusionMethod::CrossProduct,
            gravity_smoothing: 0.2,
            magnetic_smoothing: 0.1,
            heading_window: 1,
            declination_degrees: 0.0,
            azimuth_offset_degrees: 0.0,
            altitude_reference: AltitudeReference::Absolute,
        }
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            buffer_size: 12,
            sensitivity: None,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 3000,
            min_accuracy: 0.7,
            gravity_deviation_scale: 5.0,
            snapshot_min_stability: 0.6,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            complete_threshold: 80.0,
            progress_threshold: 60.0,
            gap_threshold_degrees: 15.0,
            min_points: 8,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fill_policy: FillPolicy::CarryForward,
            delimiter: ',',
            include_timestamp: false,
            coordinate_format: CoordinateFormat::Decimal,
            filename: "horizon".to_string(),
        }
    }
}
