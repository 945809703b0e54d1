//! The disk cache manager: manifest persistence and the maintenance pass.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::entry::DiskCacheEntry;
use crate::options::DiskCacheOptions;

const MANIFEST_FILE: &str = "manifest.json";

/// Errors from manifest and file housekeeping.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error on '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed manifest '{0}': {1}")]
    MalformedManifest(PathBuf, String),
}

/// What one maintenance pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Entries forgotten because their file vanished out from under us.
    pub missing_forgotten: usize,
    /// Entries removed for being older than the expiration window.
    pub expired_removed: usize,
    /// Entries evicted, oldest first, to get back under the size budget.
    pub evicted_for_size: usize,
    /// Bytes tracked after the pass.
    pub total_size_in_bytes: u64,
}

/// Per-tag usage, for reporting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TagStats {
    pub entries: usize,
    pub total_size_in_bytes: u64,
}

/// Tracks downloaded files on local storage and enforces the expiry/size
/// policy in [`DiskCacheOptions`].
///
/// The manifest is one JSON record per entry, keyed by file path, persisted
/// in the cache directory whenever the entry set changes.
pub struct DiskCache {
    directory: PathBuf,
    options: DiskCacheOptions,
    entries: HashMap<PathBuf, DiskCacheEntry>,
}

impl DiskCache {
    /// Default cache directory under the platform cache dir.
    pub fn default_directory() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wardrobe")
    }

    /// Open a cache rooted at `directory`, creating the directory and
    /// loading the manifest if one exists.
    pub fn open(
        directory: impl Into<PathBuf>,
        options: DiskCacheOptions,
    ) -> Result<Self, CacheError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).map_err(|e| CacheError::Io(directory.clone(), e))?;

        let manifest = directory.join(MANIFEST_FILE);
        let entries = match std::fs::read(&manifest) {
            Ok(bytes) => {
                let list: Vec<DiskCacheEntry> = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::MalformedManifest(manifest.clone(), e.to_string()))?;
                list.into_iter()
                    .map(|entry| (entry.file_path.clone(), entry))
                    .collect()
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(CacheError::Io(manifest, err)),
        };

        info!(
            entries = entries.len(),
            "disk cache opened at {}",
            directory.display()
        );
        Ok(Self {
            directory,
            options,
            entries,
        })
    }

    /// The directory this cache lives in.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The policy in effect.
    pub fn options(&self) -> &DiskCacheOptions {
        &self.options
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry for a cached file path.
    pub fn entry(&self, file_path: &Path) -> Option<&DiskCacheEntry> {
        self.entries.get(file_path)
    }

    /// Record a downloaded file, replacing any previous entry at the same
    /// path, and persist the manifest.
    pub fn record(&mut self, entry: DiskCacheEntry) -> Result<(), CacheError> {
        debug!(path = %entry.file_path.display(), tag = %entry.tag, "cache entry recorded");
        self.entries.insert(entry.file_path.clone(), entry);
        self.save_manifest()
    }

    /// Total size in bytes of all tracked files still on disk.
    pub fn total_size_in_bytes(&self) -> u64 {
        self.entries
            .values()
            .filter_map(|entry| std::fs::metadata(&entry.file_path).ok())
            .map(|metadata| metadata.len())
            .sum()
    }

    /// Per-tag entry counts and sizes. Tags group entries for reporting
    /// only; they never affect eviction order.
    pub fn stats_by_tag(&self) -> HashMap<String, TagStats> {
        let mut stats: HashMap<String, TagStats> = HashMap::new();
        for entry in self.entries.values() {
            let size = std::fs::metadata(&entry.file_path)
                .map(|metadata| metadata.len())
                .unwrap_or(0);
            let tag = stats.entry(entry.tag.clone()).or_default();
            tag.entries += 1;
            tag.total_size_in_bytes += size;
        }
        stats
    }

    /// Run one maintenance pass: forget entries whose file is gone, remove
    /// expired entries, then evict oldest-by-creation entries until the
    /// total size fits the budget. The manifest is persisted afterwards.
    pub fn maintain(&mut self) -> Result<MaintenanceReport, CacheError> {
        let now = Utc::now();
        let mut report = MaintenanceReport::default();

        let missing: Vec<PathBuf> = self
            .entries
            .values()
            .filter(|entry| !entry.exists())
            .map(|entry| entry.file_path.clone())
            .collect();
        for path in missing {
            self.entries.remove(&path);
            report.missing_forgotten += 1;
        }

        let expired: Vec<PathBuf> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(&self.options, now))
            .map(|entry| entry.file_path.clone())
            .collect();
        for path in expired {
            self.remove_entry(&path)?;
            report.expired_removed += 1;
        }

        if self.options.is_bounded() {
            while self.total_size_in_bytes() > self.options.max_cache_size_in_bytes {
                let oldest = self
                    .entries
                    .values()
                    .min_by_key(|entry| entry.creation_timestamp)
                    .map(|entry| entry.file_path.clone());
                let Some(path) = oldest else { break };
                self.remove_entry(&path)?;
                report.evicted_for_size += 1;
            }
        }

        report.total_size_in_bytes = self.total_size_in_bytes();
        self.save_manifest()?;
        debug!(?report, "cache maintenance pass complete");
        Ok(report)
    }

    /// Drop an entry and delete its file. A file already missing from disk
    /// is not an error.
    fn remove_entry(&mut self, file_path: &Path) -> Result<(), CacheError> {
        self.entries.remove(file_path);
        match std::fs::remove_file(file_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CacheError::Io(file_path.to_path_buf(), err)),
        }
    }

    fn save_manifest(&self) -> Result<(), CacheError> {
        let manifest = self.directory.join(MANIFEST_FILE);
        let mut list: Vec<&DiskCacheEntry> = self.entries.values().collect();
        // Stable manifest order.
        list.sort_by_key(|entry| (entry.creation_timestamp, entry.file_path.clone()));
        let json = serde_json::to_vec_pretty(&list)
            .map_err(|e| CacheError::MalformedManifest(manifest.clone(), e.to_string()))?;
        std::fs::write(&manifest, json).map_err(|e| CacheError::Io(manifest, e))
    }
}
