//! Wardrobe Cache - Disk cache metadata and maintenance
//!
//! Tracks downloaded files on local storage: one [`DiskCacheEntry`] record
//! per file, an expiry/size policy in [`DiskCacheOptions`], and a
//! [`DiskCache`] manager that persists the manifest and enforces the
//! policy on each maintenance pass.

mod cache;
mod entry;
mod options;

pub use cache::{CacheError, DiskCache, MaintenanceReport, TagStats};
pub use entry::DiskCacheEntry;
pub use options::DiskCacheOptions;
