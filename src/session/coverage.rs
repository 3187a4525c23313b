//! Coverage, completion and gap analysis over a set of captured points.

use rolling_stats::Stats;
use serde::Serialize;

use super::HorizonPoint;
use crate::config::{CaptureConfig, Resolution};
use crate::constants::FULL_CIRCLE_DEGREES;
use crate::math::{finite_or_zero, normalize_azimuth, round_to_tenth};

/// An uncovered stretch of azimuth, measured clockwise from `start` to `end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gap {
    pub start: f32,
    pub end: f32,
    pub size: f32,
}

/// Progress signal shown while capturing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageStatus {
    KeepCapturing,
    AlmostThere,
    Complete,
}

/// Summary of a point set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HorizonStatistics {
    pub total_points: usize,
    pub min_altitude: f32,
    pub max_altitude: f32,
    /// Rounded to 0.1°
    pub mean_altitude: f32,
    pub altitude_std_dev: f32,
    pub min_azimuth: f32,
    pub max_azimuth: f32,
    /// Rounded to 0.1 %
    pub coverage: f32,
}

impl HorizonStatistics {
    /// Azimuth span between the smallest and largest captured azimuth
    pub fn azimuth_range(&self) -> f32 {
        self.max_azimuth - self.min_azimuth
    }
}

/// Coverage calculator for one session resolution
///
/// Two thresholds are independent: `complete_threshold` decides
/// completion, `progress_threshold` only drives the "almost there" signal.
#[derive(Debug, Clone)]
pub struct CoverageAnalyzer {
    resolution: Resolution,
    complete_threshold: f32,
    progress_threshold: f32,
    gap_threshold: f32,
}

impl CoverageAnalyzer {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            resolution: config.resolution,
            complete_threshold: config.complete_threshold,
            progress_threshold: config.progress_threshold,
            gap_threshold: config.gap_threshold_degrees,
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Percentage (0-100) of azimuth buckets holding at least one point.
    pub fn coverage(&self, points: &[HorizonPoint]) -> f32 {
        let buckets = self.resolution.buckets();
        let mut occupied = vec![false; buckets];
        for point in points {
            occupied[self.resolution.bucket_of(point.azimuth)] = true;
        }
        let filled = occupied.iter().filter(|&&o| o).count();
        100.0 * filled as f32 / buckets as f32
    }

    /// An empty set is never complete, whatever the threshold.
    pub fn is_complete(&self, points: &[HorizonPoint]) -> bool {
        !points.is_empty() && self.coverage(points) >= self.complete_threshold
    }

    pub fn status(&self, points: &[HorizonPoint]) -> CoverageStatus {
        if self.is_complete(points) {
            return CoverageStatus::Complete;
        }
        if !points.is_empty() && self.coverage(points) >= self.progress_threshold {
            CoverageStatus::AlmostThere
        } else {
            CoverageStatus::KeepCapturing
        }
    }

    /// Stretches between neighbouring captured azimuths wider than the
    /// gap threshold, in ascending order, followed by the stretch that
    /// wraps through north.
    pub fn gaps(&self, points: &[HorizonPoint]) -> Vec<Gap> {
        let mut azimuths: Vec<f32> = points
            .iter()
            .map(|p| normalize_azimuth(p.azimuth))
            .collect();
        azimuths.sort_by(|a, b| a.total_cmp(b));
        azimuths.dedup();

        let (Some(&first), Some(&last)) = (azimuths.first(), azimuths.last()) else {
            return Vec::new();
        };

        let mut gaps: Vec<Gap> = azimuths
            .windows(2)
            .filter_map(|pair| {
                let size = pair[1] - pair[0];
                (size > self.gap_threshold).then_some(Gap {
                    start: pair[0],
                    end: pair[1],
                    size,
                })
            })
            .collect();

        let wrap = FULL_CIRCLE_DEGREES - last + first;
        if wrap > self.gap_threshold {
            gaps.push(Gap {
                start: last,
                end: first,
                size: wrap,
            });
        }

        gaps
    }

    pub fn statistics(&self, points: &[HorizonPoint]) -> HorizonStatistics {
        if points.is_empty() {
            return HorizonStatistics::default();
        }

        let mut altitude: Stats<f32> = Stats::new();
        let mut min_azimuth = f32::MAX;
        let mut max_azimuth = f32::MIN;
        for point in points {
            altitude.update(point.altitude);
            min_azimuth = min_azimuth.min(point.azimuth);
            max_azimuth = max_azimuth.max(point.azimuth);
        }

        HorizonStatistics {
            total_points: altitude.count,
            min_altitude: altitude.min,
            max_altitude: altitude.max,
            mean_altitude: round_to_tenth(altitude.mean),
            altitude_std_dev: finite_or_zero(altitude.std_dev),
            min_azimuth,
            max_azimuth,
            coverage: round_to_tenth(self.coverage(points)),
        }
    }
}

impl Default for CoverageAnalyzer {
    fn default() -> Self {
        Self::new(&CaptureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(azimuths: &[f32]) -> Vec<HorizonPoint> {
        azimuths
            .iter()
            .map(|&az| HorizonPoint::new("s", az, 5.0, 0))
            .collect()
    }

    #[test]
    fn test_one_point_per_bucket_is_full_coverage() {
        let analyzer = CoverageAnalyzer::default();
        let azimuths: Vec<f32> = (0..72).map(|i| i as f32 * 5.0).collect();
        let pts = points(&azimuths);
        assert_eq!(analyzer.coverage(&pts), 100.0);
        assert!(analyzer.is_complete(&pts));
        assert_eq!(analyzer.status(&pts), CoverageStatus::Complete);
    }

    #[test]
    fn test_empty_set() {
        let analyzer = CoverageAnalyzer::default();
        assert_eq!(analyzer.coverage(&[]), 0.0);
        assert!(!analyzer.is_complete(&[]));
        assert!(analyzer.gaps(&[]).is_empty());
        assert_eq!(analyzer.status(&[]), CoverageStatus::KeepCapturing);
        assert_eq!(analyzer.statistics(&[]), HorizonStatistics::default());
    }

    #[test]
    fn test_empty_set_incomplete_even_with_zero_threshold() {
        let analyzer = CoverageAnalyzer::new(&CaptureConfig {
            complete_threshold: 0.0,
            ..Default::default()
        });
        assert!(!analyzer.is_complete(&[]));
    }

    #[test]
    fn test_near_north_lands_in_first_bucket() {
        let analyzer = CoverageAnalyzer::default();
        // 358 rounds to 360, which is bucket 0
        let pts = points(&[0.0, 358.0, 1.0]);
        assert!((analyzer.coverage(&pts) - 100.0 / 72.0).abs() < 1e-4);
    }

    #[test]
    fn test_gaps_include_wraparound() {
        let analyzer = CoverageAnalyzer::default();
        let gaps = analyzer.gaps(&points(&[0.0, 10.0, 40.0]));
        assert_eq!(
            gaps,
            vec![
                Gap {
                    start: 10.0,
                    end: 40.0,
                    size: 30.0
                },
                Gap {
                    start: 40.0,
                    end: 0.0,
                    size: 320.0
                },
            ]
        );
    }

    #[test]
    fn test_gap_at_threshold_is_not_reported() {
        let analyzer = CoverageAnalyzer::default();
        let azimuths: Vec<f32> = (0..24).map(|i| i as f32 * 15.0).collect();
        assert!(analyzer.gaps(&points(&azimuths)).is_empty());
    }

    #[test]
    fn test_duplicate_azimuths_are_ignored() {
        let analyzer = CoverageAnalyzer::default();
        let gaps = analyzer.gaps(&points(&[100.0, 100.0, 110.0]));
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].start, 110.0);
        assert_eq!(gaps[0].end, 100.0);
        assert!((gaps[0].size - 350.0).abs() < 1e-4);
    }

    #[test]
    fn test_status_thresholds() {
        let analyzer = CoverageAnalyzer::default();
        // 45 of 72 buckets = 62.5 %
        let azimuths: Vec<f32> = (0..45).map(|i| i as f32 * 5.0).collect();
        assert_eq!(analyzer.status(&points(&azimuths)), CoverageStatus::AlmostThere);
        // 30 of 72 = 41.7 %
        let azimuths: Vec<f32> = (0..30).map(|i| i as f32 * 5.0).collect();
        assert_eq!(analyzer.status(&points(&azimuths)), CoverageStatus::KeepCapturing);
    }

    #[test]
    fn test_statistics() {
        let analyzer = CoverageAnalyzer::default();
        let pts = vec![
            HorizonPoint::new("s", 10.0, 2.0, 0),
            HorizonPoint::new("s", 200.0, 8.0, 0),
            HorizonPoint::new("s", 90.0, 5.0, 0),
        ];
        let stats = analyzer.statistics(&pts);
        assert_eq!(stats.total_points, 3);
        assert_eq!(stats.min_altitude, 2.0);
        assert_eq!(stats.max_altitude, 8.0);
        assert!((stats.mean_altitude - 5.0).abs() < 1e-4);
        assert_eq!(stats.azimuth_range(), 190.0);
        assert!((stats.coverage - 4.2).abs() < 1e-4);
    }
}
