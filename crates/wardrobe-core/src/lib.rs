//! Wardrobe Core - Core types for the Wardrobe avatar asset stack
//!
//! This crate provides the foundational types used throughout the stack:
//! - Asset identity helpers (level-of-detail tags, request ids)
//! - Color values used by material palettes and color assets

pub mod lod;
pub mod types;

pub use lod::Lod;
pub use types::{Color, RequestId};
