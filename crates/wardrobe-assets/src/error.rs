use std::path::PathBuf;

/// Errors an asset-fetch service can report.
///
/// "Asset does not exist" is not an error; services signal it with
/// `Ok(None)` and loaders surface it as a dead ref.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("I/O error reading '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to decode image '{0}': {1}")]
    ImageDecodeFailed(PathBuf, String),

    #[error("malformed descriptor '{0}': {1}")]
    MalformedDescriptor(PathBuf, String),
}
