//! Level-of-detail tags for asset requests

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known tag selecting the default quality tier.
pub const DEFAULT_LOD: &str = "Default";

/// Resolution/quality tier of a requested asset.
///
/// Lods are opaque string tags; two assets with the same id and lod are
/// interchangeable. `Lod::default()` is the `"Default"` sentinel tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lod(String);

impl Lod {
    /// Create a lod from any tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the default quality tier.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_LOD
    }
}

impl Default for Lod {
    fn default() -> Self {
        Self(DEFAULT_LOD.to_string())
    }
}

impl fmt::Display for Lod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Lod {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lod_is_sentinel() {
        let lod = Lod::default();
        assert_eq!(lod.as_str(), "Default");
        assert!(lod.is_default());
    }

    #[test]
    fn custom_lod_is_not_default() {
        let lod = Lod::new("High");
        assert_eq!(lod.as_str(), "High");
        assert!(!lod.is_default());
    }
}
