//! Wardrobe Assets - Reference-counted asset loading
//!
//! Provides the counted [`Ref`] ownership handle, typed asset loaders over
//! a pluggable fetch service, and a directory-backed catalog service for
//! the Wardrobe avatar stack.
//!
//! Callers own every ref a loader returns: check [`Ref::is_alive`] before
//! use, dispose (or drop) when done. A missing asset is a dead ref, never
//! an error.

mod asset;
mod catalog;
mod error;
mod handle;
mod loader;
mod service;

pub use asset::{
    AssetKind, BlendShapeAsset, BlendShapeChannel, BlendShapeData, ColorAsset, FlairAsset,
    FlairDescriptor, MaterialAsset, MaterialDescriptor, OutfitAsset, OutfitDescriptor,
    OutfitPiece, OutfitPieceDescriptor, PaletteEntry, Texture2DAsset, TextureData, TextureFormat,
};
pub use catalog::CatalogService;
pub use error::FetchError;
pub use handle::Ref;
pub use loader::{
    BlendShapeLoader, ColorLoader, FlairLoader, MaterialLoader, OutfitLoader, Texture2DLoader,
};
pub use service::{FetchRequest, FetchService, RawContent};
