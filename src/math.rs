//! Angle arithmetic shared by every stage.
//!
//! All functions are total: non-finite inputs are mapped to 0 (or to the
//! nearest bound where a bound exists) instead of propagating.

use crate::constants::{FULL_CIRCLE_DEGREES, MAX_ALTITUDE_DEGREES, MIN_ALTITUDE_DEGREES};

/// Replace NaN and infinities with 0.
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

/// Wrap an azimuth into [0, 360).
///
/// Non-finite input yields 0.
pub fn normalize_azimuth(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(FULL_CIRCLE_DEGREES);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= FULL_CIRCLE_DEGREES {
        0.0
    } else {
        wrapped
    }
}

/// Clamp an altitude into [-90, 90]. NaN yields 0, infinities the nearest bound.
pub fn clamp_altitude(degrees: f32) -> f32 {
    if degrees.is_nan() {
        return 0.0;
    }
    degrees.clamp(MIN_ALTITUDE_DEGREES, MAX_ALTITUDE_DEGREES)
}

/// Shortest angular distance between two azimuths, in [0, 180].
pub fn circular_distance(a: f32, b: f32) -> f32 {
    let diff = (normalize_azimuth(a) - normalize_azimuth(b)).abs();
    diff.min(FULL_CIRCLE_DEGREES - diff)
}

/// Mean direction of a set of azimuths, in [0, 360).
///
/// Accumulates in f64 so that symmetric inputs such as `[10, 350]`
/// resolve to north without f32 round-off. Empty input yields 0.
pub fn circular_mean(degrees: &[f32]) -> f32 {
    if degrees.is_empty() {
        return 0.0;
    }

    let (sum_sin, sum_cos) = degrees
        .iter()
        .map(|&d| f64::from(finite_or_zero(d)).to_radians())
        .fold((0.0_f64, 0.0_f64), |(s, c), r| (s + r.sin(), c + r.cos()));

    let mean = sum_sin.atan2(sum_cos).to_degrees().rem_euclid(360.0);
    normalize_azimuth(mean as f32)
}

/// Arithmetic mean, 0 for an empty slice.
pub fn arithmetic_mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| finite_or_zero(v)).sum::<f32>() / values.len() as f32
}

/// Round to one decimal place.
pub fn round_to_tenth(value: f32) -> f32 {
    (finite_or_zero(value) * 10.0).round() / 10.0
}

/// Altitude as written to exchange files: never below the horizon.
///
/// Also maps NaN and negative zero to a plain 0.
pub fn floor_at_horizon(altitude: f32) -> f32 {
    if altitude > 0.0 { altitude } else { 0.0 }
}
