use super::iso8601;
use crate::config::{CoordinateFormat, ExportConfig};
use crate::error::ExportError;
use crate::math::{finite_or_zero, floor_at_horizon, normalize_azimuth, round_to_tenth};
use crate::session::HorizonPoint;

/// Tenths of an arcsecond in one degree
const TENTH_ARCSEC_PER_DEGREE: u64 = 36_000;

/// Tabular export: one row per point, sorted by azimuth.
///
/// Altitudes are floored at the horizon. Fields that contain a quote
/// (sexagesimal seconds) are quoted with the quote doubled.
pub fn write_points(
    points: &[HorizonPoint],
    options: &ExportConfig,
) -> Result<String, ExportError> {
    let delimiter = options.delimiter;
    if !matches!(delimiter, ',' | ';') {
        return Err(ExportError::Delimiter(delimiter));
    }
    if points.is_empty() {
        return Err(ExportError::NoPoints);
    }

    let mut sorted: Vec<&HorizonPoint> = points.iter().collect();
    sorted.sort_by(|a, b| a.azimuth.total_cmp(&b.azimuth));

    let sep = delimiter.to_string();
    let mut header = vec!["Azimuth", "Altitude"];
    if options.include_timestamp {
        header.push("Timestamp");
    }

    let mut lines = vec![header.join(&sep)];
    for point in sorted {
        let mut row = vec![
            coordinate(point.azimuth, options.coordinate_format, true),
            coordinate(floor_at_horizon(point.altitude), options.coordinate_format, false),
        ];
        if options.include_timestamp {
            row.push(iso8601(point.timestamp_ms));
        }
        lines.push(row.iter().map(|f| quote(f)).collect::<Vec<_>>().join(&sep));
    }

    let mut content = lines.join("\n");
    content.push('\n');
    Ok(content)
}

fn coordinate(value: f32, format: CoordinateFormat, wraps: bool) -> String {
    match format {
        CoordinateFormat::Decimal => {
            let rounded = round_to_tenth(value);
            let value = if wraps { normalize_azimuth(rounded) } else { rounded };
            format!("{:.1}", value)
        }
        CoordinateFormat::Sexagesimal => sexagesimal(value, wraps),
    }
}

/// `DD°MM'SS.S"` for a non-negative angle; azimuths that round up to a
/// full turn wrap back to zero.
pub fn sexagesimal(degrees: f32, wraps: bool) -> String {
    let degrees = f64::from(finite_or_zero(degrees)).max(0.0);
    let mut tenths = (degrees * TENTH_ARCSEC_PER_DEGREE as f64).round() as u64;
    if wraps {
        tenths %= 360 * TENTH_ARCSEC_PER_DEGREE;
    }

    let whole = tenths / TENTH_ARCSEC_PER_DEGREE;
    let minutes = (tenths % TENTH_ARCSEC_PER_DEGREE) / 600;
    let seconds = tenths % 600;
    format!(
        "{:02}°{:02}'{:02}.{}\"",
        whole,
        minutes,
        seconds / 10,
        seconds % 10
    )
}

fn quote(field: &str) -> String {
    if field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
