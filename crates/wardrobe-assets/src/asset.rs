//! Asset values and their descriptor payloads.
//!
//! The asset-kind set is small and closed, so kinds are a plain enum and
//! every asset is a concrete struct rather than a trait object. Assets are
//! immutable once constructed; two assets with equal id and lod are
//! interchangeable.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use wardrobe_core::{Color, Lod};

use crate::handle::Ref;

/// The closed set of asset kinds the stack knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Color,
    Texture2D,
    Material,
    BlendShape,
    Flair,
    Outfit,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Color => "color",
            AssetKind::Texture2D => "texture2d",
            AssetKind::Material => "material",
            AssetKind::BlendShape => "blendshape",
            AssetKind::Flair => "flair",
            AssetKind::Outfit => "outfit",
        };
        f.write_str(name)
    }
}

/// Pixel format of a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8,
    Rgb8,
}

/// Decoded pixel data shared between a container and the assets derived
/// from it.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub format: TextureFormat,
}

/// One named color in a material palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub color: Color,
}

/// Material container content: shader name, named color palette, and the
/// ids of the textures the material samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDescriptor {
    pub shader: String,
    #[serde(default)]
    pub palette: Vec<PaletteEntry>,
    #[serde(default)]
    pub textures: Vec<String>,
}

impl MaterialDescriptor {
    /// Look up a palette color by name.
    pub fn color(&self, name: &str) -> Option<Color> {
        self.palette
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.color)
    }
}

/// One morph channel and its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendShapeChannel {
    pub name: String,
    pub weight: f32,
}

/// Blend shape container content: the full channel set for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendShapeData {
    #[serde(default)]
    pub channels: Vec<BlendShapeChannel>,
}

impl BlendShapeData {
    /// Look up a channel by name.
    pub fn channel(&self, name: &str) -> Option<&BlendShapeChannel> {
        self.channels.iter().find(|channel| channel.name == name)
    }
}

/// Accessory descriptor: a cosmetic item an avatar can wear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlairDescriptor {
    pub display_name: String,
    pub category: String,
    #[serde(default)]
    pub material_id: Option<String>,
}

/// One piece of an outfit: which flair goes in which slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitPieceDescriptor {
    pub slot: String,
    pub flair_id: String,
}

/// Outfit container content: the pieces making up one complete look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitDescriptor {
    #[serde(default)]
    pub pieces: Vec<OutfitPieceDescriptor>,
}

/// One named color extracted from a material container.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAsset {
    pub id: String,
    pub lod: Lod,
    pub name: String,
    pub color: Color,
}

/// A loaded 2D texture. The pixel data is shared with the container it was
/// decoded into, which the wrapping ref keeps alive.
#[derive(Debug, Clone)]
pub struct Texture2DAsset {
    pub id: String,
    pub lod: Lod,
    pub texture: Arc<TextureData>,
}

/// A loaded material.
#[derive(Debug, Clone)]
pub struct MaterialAsset {
    pub id: String,
    pub lod: Lod,
    pub material: Arc<MaterialDescriptor>,
}

/// One morph channel extracted from a blend shape container.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendShapeAsset {
    pub id: String,
    pub lod: Lod,
    pub channel: String,
    pub weight: f32,
}

/// A loaded accessory.
#[derive(Debug, Clone)]
pub struct FlairAsset {
    pub id: String,
    pub lod: Lod,
    pub flair: Arc<FlairDescriptor>,
}

/// One resolved piece of a loaded outfit. The flair ref may be dead when
/// the piece could not be resolved; the outfit still loads.
#[derive(Debug, Clone)]
pub struct OutfitPiece {
    pub slot: String,
    pub flair: Ref<FlairAsset>,
}

/// A loaded outfit. Disposing the outfit's ref drops every piece, releasing
/// the flairs it resolved.
#[derive(Debug, Clone)]
pub struct OutfitAsset {
    pub id: String,
    pub lod: Lod,
    pub pieces: Vec<OutfitPiece>,
}
