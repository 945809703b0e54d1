//! The seam between typed loaders and whatever actually stores content.

use std::future::Future;
use std::sync::Arc;

use wardrobe_core::Lod;

use crate::asset::{
    AssetKind, BlendShapeData, FlairDescriptor, MaterialDescriptor, OutfitDescriptor, TextureData,
};
use crate::error::FetchError;
use crate::handle::Ref;

/// Request for one unit of raw container content.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub kind: AssetKind,
    pub id: String,
    pub lod: Lod,
    /// For slotted loads: which palette entry, morph channel, etc. the
    /// caller is after. Services may ignore it; extraction happens in the
    /// loader.
    pub slot: Option<String>,
}

/// Untyped container content as produced by a fetch service. Heavyweight
/// payloads are `Arc`-shared so derived assets alias them instead of
/// copying.
#[derive(Debug, Clone)]
pub enum RawContent {
    Texture(Arc<TextureData>),
    Material(Arc<MaterialDescriptor>),
    BlendShapes(Arc<BlendShapeData>),
    Flair(Arc<FlairDescriptor>),
    Outfit(Arc<OutfitDescriptor>),
}

/// Asynchronous source of raw container content, keyed by kind, id, and
/// lod. Implemented in-repo by the directory catalog and by test spies;
/// an Addressables-style remote store would plug in here.
///
/// `Ok(None)` means the asset does not exist; errors are reserved for
/// content that exists but cannot be produced. Each call is one fetch:
/// services are not required to coalesce concurrent requests for the same
/// id, and loaders do not assume they do.
pub trait FetchService: Send + Sync {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<Option<Ref<RawContent>>, FetchError>> + Send;
}
