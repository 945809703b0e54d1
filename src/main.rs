//! Wardrobe - reference-counted avatar asset loading
//!
//! Demo entry point: loads a few assets through the directory catalog,
//! reports what resolved, and runs a disk cache maintenance pass.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use wardrobe_assets::{CatalogService, MaterialLoader, OutfitLoader, Texture2DLoader};
use wardrobe_cache::{DiskCache, DiskCacheOptions};
use wardrobe_core::Lod;

/// Demo configuration, read from `wardrobe.toml` when present.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    /// Root directory of the asset catalog.
    asset_root: PathBuf,
    /// Disk cache directory; the platform cache dir when unset.
    cache_dir: Option<PathBuf>,
    /// Disk cache policy.
    cache: DiskCacheOptions,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            cache_dir: None,
            cache: DiskCacheOptions::default(),
        }
    }
}

fn load_config() -> DemoConfig {
    match std::fs::read_to_string("wardrobe.toml") {
        Ok(text) => match toml::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                warn!("invalid wardrobe.toml, using defaults: {err}");
                DemoConfig::default()
            }
        },
        Err(_) => DemoConfig::default(),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = load_config();
    info!("asset root: {}", config.asset_root.display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let catalog = Arc::new(CatalogService::new(config.asset_root));
    let lod = Lod::default();

    runtime.block_on(async {
        let textures = Texture2DLoader::new(Arc::clone(&catalog));
        let materials = MaterialLoader::new(Arc::clone(&catalog));
        let outfits = OutfitLoader::new(Arc::clone(&catalog));

        for id in ["hat_01", "jacket_03"] {
            let mut texture = textures.load(id, &lod).await;
            match texture.item() {
                Some(asset) => info!(
                    "texture '{}' loaded ({}x{})",
                    asset.id, asset.texture.width, asset.texture.height
                ),
                None => info!("texture '{id}' not available"),
            }
            texture.dispose();
        }

        let mut material = materials.load("denim_jacket", &lod).await;
        match material.item() {
            Some(asset) => info!(
                "material '{}' loaded with {} palette colors",
                asset.id,
                asset.material.palette.len()
            ),
            None => info!("material 'denim_jacket' not available"),
        }
        material.dispose();

        let mut outfit = outfits.load("casual_set", &lod).await;
        match outfit.item() {
            Some(asset) => {
                let resolved = asset.pieces.iter().filter(|p| p.flair.is_alive()).count();
                info!(
                    "outfit '{}': {}/{} pieces resolved",
                    asset.id,
                    resolved,
                    asset.pieces.len()
                );
            }
            None => info!("outfit 'casual_set' not available"),
        }
        outfit.dispose();
    });

    let cache_dir = config.cache_dir.unwrap_or_else(DiskCache::default_directory);
    let mut cache = DiskCache::open(cache_dir, config.cache)?;
    let report = cache.maintain()?;
    info!(
        "cache maintenance: {} expired, {} evicted, {} bytes tracked",
        report.expired_removed, report.evicted_for_size, report.total_size_in_bytes
    );

    Ok(())
}
