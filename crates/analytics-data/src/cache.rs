//! Memoised session-table loading.
//!
//! [`TableCache`] keeps one loaded table per file path, keyed by a version
//! stamp (modification time and length). Repeated dashboard renders with
//! different filters reuse the parsed rows; a file whose stamp changed is
//! reloaded on the next request.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use analytics_core::error::{AnalyticsError, Result};
use analytics_core::models::SessionRecord;

use crate::reader::load_sessions;

/// Identity of a file's contents as seen by the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileVersion {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl FileVersion {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|source| AnalyticsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug)]
struct CachedTable {
    version: FileVersion,
    records: Vec<SessionRecord>,
}

/// Path-keyed cache of loaded session tables.
#[derive(Debug, Default)]
pub struct TableCache {
    tables: HashMap<PathBuf, CachedTable>,
    loads: u64,
    hits: u64,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table at `path`, loading it on first use or when the file's
    /// version stamp no longer matches the cached one.
    pub fn get(&mut self, path: &Path) -> Result<&[SessionRecord]> {
        let version = FileVersion::of(path)?;

        let fresh = self
            .tables
            .get(path)
            .is_some_and(|cached| cached.version == version);

        if fresh {
            self.hits += 1;
            tracing::debug!(path = %path.display(), "returning cached session table");
        } else {
            let records = load_sessions(path)?;
            self.loads += 1;
            tracing::info!(
                path = %path.display(),
                rows = records.len(),
                "session table loaded into cache"
            );
            self.tables
                .insert(path.to_path_buf(), CachedTable { version, records });
        }

        self.tables
            .get(path)
            .map(|cached| cached.records.as_slice())
            .ok_or_else(|| AnalyticsError::Config(format!("cache miss for {}", path.display())))
    }

    /// Number of times a file was actually read from disk.
    pub fn loads(&self) -> u64 {
        self.loads
    }

    /// Number of requests served without touching the file contents.
    pub fn hits(&self) -> u64 {
        self.hits
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate_sessions, write_sessions, GeneratorConfig};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn write_table(path: &Path, days: u32, avg: f64) -> usize {
        let config = GeneratorConfig::new(days, avg)
            .with_end_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let records = generate_sessions(config).unwrap();
        write_sessions(path, &records).unwrap();
        records.len()
    }

    #[test]
    fn test_first_get_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.csv");
        let rows = write_table(&path, 3, 20.0);

        let mut cache = TableCache::new();
        assert_eq!(cache.get(&path).unwrap().len(), rows);
        assert_eq!(cache.loads(), 1);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_repeated_get_is_memoised() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.csv");
        write_table(&path, 3, 20.0);

        let mut cache = TableCache::new();
        let first = cache.get(&path).unwrap().to_vec();
        let second = cache.get(&path).unwrap().to_vec();
        let third = cache.get(&path).unwrap().to_vec();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(cache.loads(), 1);
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn test_changed_file_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.csv");
        write_table(&path, 2, 10.0);

        let mut cache = TableCache::new();
        cache.get(&path).unwrap();

        // A larger table changes the length component of the version stamp.
        let rows = write_table(&path, 20, 50.0);
        assert_eq!(cache.get(&path).unwrap().len(), rows);
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let mut cache = TableCache::new();
        let err = cache.get(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, AnalyticsError::FileRead { .. }));
        assert_eq!(cache.loads(), 0);
    }
}
