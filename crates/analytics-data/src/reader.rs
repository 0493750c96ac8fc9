//! CSV loading for session tables written by the generator.

use std::path::Path;

use analytics_core::error::{AnalyticsError, Result};
use analytics_core::models::SessionRecord;
use tracing::debug;

/// Load every row of the session table at `path`.
///
/// A missing file or any malformed row is fatal; nothing is skipped.
pub fn load_sessions(path: &Path) -> Result<Vec<SessionRecord>> {
    let file = std::fs::File::open(path).map_err(|source| AnalyticsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(std::io::BufReader::new(file));

    let records = reader
        .deserialize::<SessionRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| AnalyticsError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), rows = records.len(), "session table loaded");
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
