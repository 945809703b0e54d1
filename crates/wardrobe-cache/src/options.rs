use serde::{Deserialize, Serialize};

/// Expiry and size policy for the disk cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskCacheOptions {
    /// Entries older than this are removed on the next maintenance pass.
    #[serde(default = "default_expiration")]
    pub cache_expiration_in_seconds: u64,
    /// Total size budget in bytes; 0 means unbounded.
    #[serde(default)]
    pub max_cache_size_in_bytes: u64,
}

fn default_expiration() -> u64 {
    86400 // one day
}

impl Default for DiskCacheOptions {
    fn default() -> Self {
        Self {
            cache_expiration_in_seconds: default_expiration(),
            max_cache_size_in_bytes: 0,
        }
    }
}

impl DiskCacheOptions {
    /// Whether a size budget is in effect.
    pub fn is_bounded(&self) -> bool {
        self.max_cache_size_in_bytes > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_day_unbounded() {
        let options = DiskCacheOptions::default();
        assert_eq!(options.cache_expiration_in_seconds, 86400);
        assert_eq!(options.max_cache_size_in_bytes, 0);
        assert!(!options.is_bounded());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let options: DiskCacheOptions =
            serde_json::from_str(r#"{ "max_cache_size_in_bytes": 1024 }"#).unwrap();
        assert_eq!(options.cache_expiration_in_seconds, 86400);
        assert!(options.is_bounded());
    }
}
