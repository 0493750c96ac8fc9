use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the web analytics crates.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV row could not be decoded into a session record.
    #[error("Failed to parse CSV in {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The session table could not be written.
    #[error("Failed to write CSV to {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Dashboard output could not be encoded as JSON.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A date string was not in `YYYY-MM-DD` form.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The filter start date lies after its end date.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// Generator parameters are out of range.
    #[error("Invalid generator config: {0}")]
    InvalidGeneratorConfig(String),

    /// A dashboard tab name is not one of the recognised tabs.
    #[error("Unknown tab: {0}")]
    UnknownTab(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the analytics crates.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
