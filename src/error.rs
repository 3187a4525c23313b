use thiserror::Error;

#[derive(Error, Debug)]
pub enum HorizonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Persistence(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("No orientation reading available")]
    NoReading,

    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Invalid recording at line {line}: {reason}")]
    Recording { line: usize, reason: String },
}

/// Reasons an export is rejected before any text is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("no points to export")]
    NoPoints,

    #[error("unsupported delimiter {0:?} (expected ',' or ';')")]
    Delimiter(char),

    #[error("resolution {0}° does not divide 360")]
    Resolution(u32),

    #[error("encoding failed: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, HorizonError>;
