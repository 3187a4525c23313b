use std::ops::Index;

use crate::config::{FillPolicy, Resolution};
use crate::constants::WHOLE_DEGREE_BUCKETS;
use crate::session::HorizonPoint;

/// Gap-free altitude profile, one entry per azimuth bucket
///
/// Derived from the current point set every time it is needed; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonProfile {
    resolution: Resolution,
    values: Vec<f32>,
}

impl HorizonProfile {
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Altitude for any integer azimuth, looked up in the bucket it rounds to.
    pub fn altitude_at(&self, azimuth: u32) -> f32 {
        self.values[self.resolution.bucket_of(azimuth as f32)]
    }

    /// `(bucket center azimuth, altitude)` pairs in ascending azimuth order
    pub fn entries(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &alt)| (self.resolution.center_of(i), alt))
    }
}

impl Index<usize> for HorizonProfile {
    type Output = f32;

    fn index(&self, bucket: usize) -> &f32 {
        &self.values[bucket]
    }
}

/// Build a complete profile from sparse points.
///
/// Carry-forward always produces a whole-degree profile and ignores
/// `resolution`; nearest-neighbor produces one entry per bucket of
/// `resolution`. No points yields a profile of zeros.
pub fn build_profile(
    points: &[HorizonPoint],
    resolution: Resolution,
    policy: FillPolicy,
) -> HorizonProfile {
    match policy {
        FillPolicy::CarryForward => carry_forward(points),
        FillPolicy::NearestNeighbor => nearest_neighbor(points, resolution),
    }
}

fn carry_forward(points: &[HorizonPoint]) -> HorizonProfile {
    let resolution = Resolution::WHOLE_DEGREE;
    let mut minima: Vec<Option<f32>> = vec![None; WHOLE_DEGREE_BUCKETS];

    for point in points {
        let slot = &mut minima[resolution.bucket_of(point.azimuth)];
        *slot = Some(slot.map_or(point.altitude, |m| m.min(point.altitude)));
    }

    let Some(first) = minima.iter().flatten().next().copied() else {
        return HorizonProfile {
            resolution,
            values: vec![0.0; WHOLE_DEGREE_BUCKETS],
        };
    };

    let mut carried = first;
    let values = minima
        .iter()
        .map(|m| {
            if let Some(v) = m {
                carried = *v;
            }
            carried
        })
        .collect();

    HorizonProfile { resolution, values }
}

fn nearest_neighbor(points: &[HorizonPoint], resolution: Resolution) -> HorizonProfile {
    let values = (0..resolution.buckets())
        .map(|bucket| {
            let center = resolution.center_of(bucket);
            points
                .iter()
                .map(|p| ((p.azimuth - center).abs(), p.azimuth, p.altitude))
                .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)))
                .map_or(0.0, |(_, _, altitude)| altitude)
        })
        .collect();

    HorizonProfile { resolution, values }
}
