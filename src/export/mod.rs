mod csv;
mod hzn;
mod json;
mod profile;

use chrono::{DateTime, Utc};

pub use self::csv::{sexagesimal, write_points};
pub use self::hzn::{HZN_HEADER, write_profile};
pub use self::json::{SessionDump, write_session};
pub use self::profile::{HorizonProfile, build_profile};

use crate::config::{CaptureConfig, ExportConfig, Resolution};
use crate::error::{ExportError, Result};
use crate::session::{CaptureSession, HorizonPoint, HorizonStatistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Plain `azimuth altitude` profile
    Hzn,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Hzn => "hzn",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Serialized export plus the file name suggested to the sink
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub filename: String,
    pub content: String,
}

/// Destination for finished exports (file, share sheet, stdout)
pub trait ExportSink {
    fn deliver(&mut self, file: &ExportedFile) -> anyhow::Result<()>;
}

/// Sink that keeps every delivered file in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: Vec<ExportedFile>,
}

impl ExportSink for MemorySink {
    fn deliver(&mut self, file: &ExportedFile) -> anyhow::Result<()> {
        self.files.push(file.clone());
        Ok(())
    }
}

/// Builds profiles and serializes sessions in the configured formats
pub struct HorizonExporter {
    config: ExportConfig,
    resolution: Resolution,
    min_points: usize,
}

impl HorizonExporter {
    pub fn new(config: &ExportConfig, capture: &CaptureConfig) -> Self {
        Self {
            config: config.clone(),
            resolution: capture.resolution,
            min_points: capture.min_points,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn build_profile(&self, points: &[HorizonPoint]) -> HorizonProfile {
        build_profile(points, self.resolution, self.config.fill_policy)
    }

    /// Serialize a session. Fails before producing any text if there is
    /// nothing to export or the options are unusable.
    pub fn export(
        &self,
        format: ExportFormat,
        session: &CaptureSession,
        points: &[HorizonPoint],
        statistics: HorizonStatistics,
    ) -> Result<ExportedFile> {
        if !matches!(self.config.delimiter, ',' | ';') {
            return Err(ExportError::Delimiter(self.config.delimiter).into());
        }
        if points.is_empty() {
            return Err(ExportError::NoPoints.into());
        }
        if points.len() < self.min_points {
            log::warn!(
                "Exporting only {} points (recommended at least {})",
                points.len(),
                self.min_points
            );
        }

        let content = match format {
            ExportFormat::Hzn => write_profile(&self.build_profile(points)),
            ExportFormat::Csv => write_points(points, &self.config)?,
            ExportFormat::Json => write_session(session, points, statistics)?,
        };

        let file = ExportedFile {
            filename: format!("{}.{}", self.config.filename, format.extension()),
            content,
        };
        log::info!(
            "Exported {} points from session {} as {}",
            points.len(),
            session.id,
            file.filename
        );
        Ok(file)
    }
}

/// ISO-8601 UTC with milliseconds, e.g. `2024-05-01T21:04:11.250Z`.
/// Out-of-range timestamps yield an empty string.
pub fn iso8601(timestamp_ms: u64) -> String {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .unwrap_or_default()
}

pub fn iso8601_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn timestamp_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HorizonError;

    fn exporter(config: ExportConfig) -> HorizonExporter {
        HorizonExporter::new(&config, &CaptureConfig::default())
    }

    #[test]
    fn test_export_names_file_by_format() {
        let e = exporter(ExportConfig {
            filename: "backyard".to_string(),
            ..Default::default()
        });
        let session = CaptureSession::new("s", "Backyard", 0);
        let points = vec![HorizonPoint::new("s", 0.0, 3.0, 0)];

        let hzn = e
            .export(ExportFormat::Hzn, &session, &points, HorizonStatistics::default())
            .unwrap();
        assert_eq!(hzn.filename, "backyard.hzn");
        assert!(hzn.content.starts_with(HZN_HEADER));

        let csv = e
            .export(ExportFormat::Csv, &session, &points, HorizonStatistics::default())
            .unwrap();
        assert_eq!(csv.filename, "backyard.csv");
    }

    #[test]
    fn test_export_errors_before_output() {
        let session = CaptureSession::new("s", "S", 0);
        let err = exporter(ExportConfig::default())
            .export(ExportFormat::Hzn, &session, &[], HorizonStatistics::default())
            .unwrap_err();
        assert!(matches!(err, HorizonError::Export(ExportError::NoPoints)));

        let err = exporter(ExportConfig {
            delimiter: '|',
            ..Default::default()
        })
        .export(
            ExportFormat::Hzn,
            &session,
            &[HorizonPoint::new("s", 0.0, 0.0, 0)],
            HorizonStatistics::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HorizonError::Export(ExportError::Delimiter('|'))));
    }

    #[test]
    fn test_negative_altitude_floors_in_both_formats() {
        let e = exporter(ExportConfig::default());
        let session = CaptureSession::new("s", "S", 0);
        let points = vec![HorizonPoint::new("s", 0.0, -5.0, 0)];

        let hzn = e
            .export(ExportFormat::Hzn, &session, &points, HorizonStatistics::default())
            .unwrap();
        assert_eq!(hzn.content.lines().nth(1), Some("0 0"));

        let csv = e
            .export(ExportFormat::Csv, &session, &points, HorizonStatistics::default())
            .unwrap();
        assert_eq!(csv.content.lines().nth(1), Some("0.0,0.0"));
    }

    #[test]
    fn test_iso8601() {
        assert_eq!(iso8601(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601(1_500), "1970-01-01T00:00:01.500Z");
        assert_eq!(iso8601(u64::MAX), "");
    }

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::default();
        let file = ExportedFile {
            filename: "a.hzn".to_string(),
            content: String::new(),
        };
        sink.deliver(&file).unwrap();
        assert_eq!(sink.files, vec![file]);
    }
}
