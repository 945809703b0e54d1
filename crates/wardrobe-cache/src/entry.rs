use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::options::DiskCacheOptions;

/// Metadata for one locally cached downloaded file.
///
/// The entry is a pure record: only the cache manager mutates the set of
/// entries, and an entry is meaningful only while the file at `file_path`
/// still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskCacheEntry {
    /// Remote distribution URL this file was downloaded from.
    pub source_url: String,
    /// Path of the cached file on disk; the manifest key.
    pub file_path: PathBuf,
    /// When the file was written.
    pub creation_timestamp: DateTime<Utc>,
    /// Grouping tag. Used for reporting only, never for eviction order.
    pub tag: String,
}

impl DiskCacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(
        source_url: impl Into<String>,
        file_path: impl Into<PathBuf>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            file_path: file_path.into(),
            creation_timestamp: Utc::now(),
            tag: tag.into(),
        }
    }

    /// Whether this entry is older than the options' expiration window.
    pub fn is_expired(&self, options: &DiskCacheOptions, now: DateTime<Utc>) -> bool {
        now - self.creation_timestamp
            > Duration::seconds(options.cache_expiration_in_seconds as i64)
    }

    /// Whether the cached file still exists on disk.
    pub fn exists(&self) -> bool {
        self.file_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_is_not_expired() {
        let entry = DiskCacheEntry::new("https://cdn.example.com/hat_01", "/tmp/hat_01", "hats");
        assert!(!entry.is_expired(&DiskCacheOptions::default(), Utc::now()));
    }

    #[test]
    fn entry_past_the_window_is_expired() {
        let mut entry = DiskCacheEntry::new("https://cdn.example.com/hat_01", "/tmp/hat_01", "hats");
        entry.creation_timestamp = Utc::now() - Duration::days(2);
        assert!(entry.is_expired(&DiskCacheOptions::default(), Utc::now()));
    }

    #[test]
    fn entry_serde_round_trip() {
        let entry = DiskCacheEntry::new("https://cdn.example.com/hat_01", "/tmp/hat_01", "hats");
        let json = serde_json::to_string(&entry).unwrap();
        let back: DiskCacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
