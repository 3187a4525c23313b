use serde::Serialize;

use super::iso8601_now;
use crate::error::ExportError;
use crate::session::{CaptureSession, HorizonPoint, HorizonStatistics};

/// Full session dump for backup and sharing
#[derive(Debug, Serialize)]
pub struct SessionDump<'a> {
    pub export_date: String,
    pub session: &'a CaptureSession,
    pub statistics: HorizonStatistics,
    pub points: &'a [HorizonPoint],
}

pub fn write_session(
    session: &CaptureSession,
    points: &[HorizonPoint],
    statistics: HorizonStatistics,
) -> Result<String, ExportError> {
    if points.is_empty() {
        return Err(ExportError::NoPoints);
    }
    let dump = SessionDump {
        export_date: iso8601_now(),
        session,
        statistics,
        points,
    };
    serde_json::to_string_pretty(&dump).map_err(|e| ExportError::Encoding(e.to_string()))
}
