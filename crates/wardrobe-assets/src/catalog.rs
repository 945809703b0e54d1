//! Directory-backed fetch service.
//!
//! The catalog serves container content straight from a local asset tree:
//!
//! ```text
//! <root>/textures/<id>.<lod>.png     (or .jpg)
//! <root>/materials/<id>.<lod>.json
//! <root>/blendshapes/<id>.<lod>.json
//! <root>/flairs/<id>.<lod>.json
//! <root>/outfits/<id>.<lod>.json
//! ```
//!
//! A missing file is "not found", never an error. Color requests resolve
//! against the materials tree, since colors live inside material
//! containers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{info, trace};

use crate::asset::{AssetKind, TextureData, TextureFormat};
use crate::error::FetchError;
use crate::handle::Ref;
use crate::service::{FetchRequest, FetchService, RawContent};

const TEXTURE_EXTENSIONS: &[&str] = &["png", "jpg"];

/// Fetch service resolving asset ids against a local directory tree.
pub struct CatalogService {
    root: PathBuf,
}

impl CatalogService {
    /// Create a catalog rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        info!("asset catalog rooted at {}", root.display());
        Self { root }
    }

    /// The directory this catalog resolves ids against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(kind: AssetKind) -> &'static str {
        match kind {
            // Colors are extracted from material containers.
            AssetKind::Color | AssetKind::Material => "materials",
            AssetKind::Texture2D => "textures",
            AssetKind::BlendShape => "blendshapes",
            AssetKind::Flair => "flairs",
            AssetKind::Outfit => "outfits",
        }
    }

    fn content_path(&self, request: &FetchRequest, extension: &str) -> PathBuf {
        self.root
            .join(Self::kind_dir(request.kind))
            .join(format!("{}.{}.{}", request.id, request.lod, extension))
    }

    async fn read_first(&self, request: &FetchRequest, extensions: &[&str])
        -> Result<Option<(PathBuf, Vec<u8>)>, FetchError> {
        for extension in extensions {
            let path = self.content_path(request, extension);
            match tokio::fs::read(&path).await {
                Ok(bytes) => return Ok(Some((path, bytes))),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(FetchError::Io(path, err)),
            }
        }
        Ok(None)
    }

    fn decode_texture(path: &Path, bytes: &[u8]) -> Result<TextureData, FetchError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| FetchError::ImageDecodeFailed(path.to_path_buf(), e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(TextureData {
            width,
            height,
            data: rgba.into_raw(),
            format: TextureFormat::Rgba8,
        })
    }
}

fn parse_descriptor<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, FetchError> {
    serde_json::from_slice(bytes)
        .map_err(|e| FetchError::MalformedDescriptor(path.to_path_buf(), e.to_string()))
}

impl FetchService for CatalogService {
    async fn fetch(&self, request: FetchRequest) -> Result<Option<Ref<RawContent>>, FetchError> {
        let extensions: &[&str] = match request.kind {
            AssetKind::Texture2D => TEXTURE_EXTENSIONS,
            _ => &["json"],
        };
        let Some((path, bytes)) = self.read_first(&request, extensions).await? else {
            return Ok(None);
        };

        let content = match request.kind {
            AssetKind::Texture2D => {
                RawContent::Texture(Arc::new(Self::decode_texture(&path, &bytes)?))
            }
            AssetKind::Color | AssetKind::Material => {
                RawContent::Material(Arc::new(parse_descriptor(&path, &bytes)?))
            }
            AssetKind::BlendShape => {
                RawContent::BlendShapes(Arc::new(parse_descriptor(&path, &bytes)?))
            }
            AssetKind::Flair => RawContent::Flair(Arc::new(parse_descriptor(&path, &bytes)?)),
            AssetKind::Outfit => RawContent::Outfit(Arc::new(parse_descriptor(&path, &bytes)?)),
        };

        let id = request.id.clone();
        trace!(id, path = %path.display(), "container loaded");
        Ok(Some(Ref::with_release(content, move || {
            trace!(id, "container released");
        })))
    }
}
