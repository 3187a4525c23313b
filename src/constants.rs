//! Numeric constants shared by the fusion, scoring and export stages.

/// Degrees in a full turn of azimuth.
pub const FULL_CIRCLE_DEGREES: f32 = 360.0;

/// Lower altitude bound (nadir).
pub const MIN_ALTITUDE_DEGREES: f32 = -90.0;

/// Upper altitude bound (zenith).
pub const MAX_ALTITUDE_DEGREES: f32 = 90.0;

/// Vectors shorter than this cannot be normalized reliably.
/// Used when the smoothed gravity or magnetic vector, or their cross
/// product, collapses (e.g. field parallel to gravity).
pub const VECTOR_NORM_EPSILON: f32 = 1e-6;

/// Standard gravity in m/s², for converting accelerometer output to g.
pub const STANDARD_GRAVITY: f32 = 9.806_65;

/// Number of whole-degree entries in a carry-forward profile.
pub const WHOLE_DEGREE_BUCKETS: usize = 360;
