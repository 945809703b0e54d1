//! Typed asset loaders.
//!
//! Each loader translates an id (plus lod, plus a slot for the slotted
//! variants) into a strongly typed ref by delegating to a [`FetchService`].
//! The contract is uniform:
//!
//! - a blank id returns a dead ref without touching the service;
//! - "not found" and upstream failures both normalize to a dead ref, so
//!   callers have a single `is_alive` check and a missing asset can never
//!   crash the consumer;
//! - a successful load echoes the requested id and lod on the asset;
//! - every call performs exactly one fetch; concurrent loads of the same id
//!   are independent.
//!
//! Assets extracted from a container are built with
//! [`Ref::from_dependent_resource`], so the container stays loaded exactly
//! as long as something derived from it is alive.

use std::sync::Arc;

use tracing::{debug, warn};

use wardrobe_core::{Lod, RequestId};

use crate::asset::{
    AssetKind, BlendShapeAsset, ColorAsset, FlairAsset, MaterialAsset, OutfitAsset, OutfitPiece,
    Texture2DAsset,
};
use crate::handle::Ref;
use crate::service::{FetchRequest, FetchService, RawContent};

fn is_blank(id: &str) -> bool {
    id.trim().is_empty()
}

/// One fetch, with not-found and failure normalized to `None`.
async fn fetch_container<S: FetchService>(
    service: &S,
    kind: AssetKind,
    id: &str,
    lod: &Lod,
    slot: Option<&str>,
) -> Option<Ref<RawContent>> {
    let request_id = RequestId::new();
    debug!(%request_id, %kind, id, %lod, "resolving asset");

    let request = FetchRequest {
        kind,
        id: id.to_string(),
        lod: lod.clone(),
        slot: slot.map(str::to_string),
    };

    match service.fetch(request).await {
        Ok(Some(container)) => Some(container),
        Ok(None) => {
            debug!(%request_id, %kind, id, "asset not found");
            None
        }
        Err(err) => {
            warn!(%request_id, %kind, id, error = %err, "asset fetch failed");
            None
        }
    }
}

/// Loads decoded 2D textures.
pub struct Texture2DLoader<S> {
    service: Arc<S>,
}

impl<S: FetchService> Texture2DLoader<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    pub async fn load(&self, id: &str, lod: &Lod) -> Ref<Texture2DAsset> {
        if is_blank(id) {
            return Ref::empty();
        }
        let Some(container) =
            fetch_container(&*self.service, AssetKind::Texture2D, id, lod, None).await
        else {
            return Ref::empty();
        };

        let texture = match container.item() {
            Some(RawContent::Texture(data)) => Arc::clone(data),
            _ => {
                warn!(id, "container did not hold texture content");
                return Ref::empty();
            }
        };

        let asset = Texture2DAsset {
            id: id.to_string(),
            lod: lod.clone(),
            texture,
        };
        Ref::from_dependent_resource(asset, container)
    }
}

/// Loads materials.
pub struct MaterialLoader<S> {
    service: Arc<S>,
}

impl<S: FetchService> MaterialLoader<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    pub async fn load(&self, id: &str, lod: &Lod) -> Ref<MaterialAsset> {
        if is_blank(id) {
            return Ref::empty();
        }
        let Some(container) =
            fetch_container(&*self.service, AssetKind::Material, id, lod, None).await
        else {
            return Ref::empty();
        };

        let material = match container.item() {
            Some(RawContent::Material(descriptor)) => Arc::clone(descriptor),
            _ => {
                warn!(id, "container did not hold material content");
                return Ref::empty();
            }
        };

        let asset = MaterialAsset {
            id: id.to_string(),
            lod: lod.clone(),
            material,
        };
        Ref::from_dependent_resource(asset, container)
    }
}

/// Slotted loader extracting one named palette color from a material
/// container.
pub struct ColorLoader<S> {
    service: Arc<S>,
}

impl<S: FetchService> ColorLoader<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    pub async fn load_slot(
        &self,
        material_id: &str,
        color_slot: &str,
        lod: &Lod,
    ) -> Ref<ColorAsset> {
        if is_blank(material_id) || is_blank(color_slot) {
            return Ref::empty();
        }
        let Some(container) = fetch_container(
            &*self.service,
            AssetKind::Material,
            material_id,
            lod,
            Some(color_slot),
        )
        .await
        else {
            return Ref::empty();
        };

        let color = match container.item() {
            Some(RawContent::Material(descriptor)) => descriptor.color(color_slot),
            _ => None,
        };
        let Some(color) = color else {
            // Container ref drops here, releasing it.
            debug!(material_id, color_slot, "material has no such palette entry");
            return Ref::empty();
        };

        let asset = ColorAsset {
            id: material_id.to_string(),
            lod: lod.clone(),
            name: color_slot.to_string(),
            color,
        };
        Ref::from_dependent_resource(asset, container)
    }
}

/// Slotted loader extracting one morph channel from a blend shape
/// container.
pub struct BlendShapeLoader<S> {
    service: Arc<S>,
}

impl<S: FetchService> BlendShapeLoader<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    pub async fn load_slot(&self, id: &str, channel: &str, lod: &Lod) -> Ref<BlendShapeAsset> {
        if is_blank(id) || is_blank(channel) {
            return Ref::empty();
        }
        let Some(container) = fetch_container(
            &*self.service,
            AssetKind::BlendShape,
            id,
            lod,
            Some(channel),
        )
        .await
        else {
            return Ref::empty();
        };

        let weight = match container.item() {
            Some(RawContent::BlendShapes(shapes)) => {
                shapes.channel(channel).map(|found| found.weight)
            }
            _ => None,
        };
        let Some(weight) = weight else {
            debug!(id, channel, "blend shape has no such channel");
            return Ref::empty();
        };

        let asset = BlendShapeAsset {
            id: id.to_string(),
            lod: lod.clone(),
            channel: channel.to_string(),
            weight,
        };
        Ref::from_dependent_resource(asset, container)
    }
}

/// Loads accessory descriptors.
pub struct FlairLoader<S> {
    service: Arc<S>,
}

impl<S: FetchService> FlairLoader<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    pub async fn load(&self, id: &str, lod: &Lod) -> Ref<FlairAsset> {
        if is_blank(id) {
            return Ref::empty();
        }
        let Some(container) = fetch_container(&*self.service, AssetKind::Flair, id, lod, None).await
        else {
            return Ref::empty();
        };

        let flair = match container.item() {
            Some(RawContent::Flair(descriptor)) => Arc::clone(descriptor),
            _ => {
                warn!(id, "container did not hold flair content");
                return Ref::empty();
            }
        };

        let asset = FlairAsset {
            id: id.to_string(),
            lod: lod.clone(),
            flair,
        };
        Ref::from_dependent_resource(asset, container)
    }
}

/// Loads an outfit and every flair it references.
///
/// A piece that fails to resolve becomes a dead piece ref; the outfit
/// itself still loads. Disposing the outfit ref drops the pieces,
/// releasing the flairs it did resolve.
pub struct OutfitLoader<S> {
    service: Arc<S>,
}

impl<S: FetchService> OutfitLoader<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    pub async fn load(&self, id: &str, lod: &Lod) -> Ref<OutfitAsset> {
        if is_blank(id) {
            return Ref::empty();
        }
        let Some(container) =
            fetch_container(&*self.service, AssetKind::Outfit, id, lod, None).await
        else {
            return Ref::empty();
        };

        let descriptor = match container.item() {
            Some(RawContent::Outfit(descriptor)) => Arc::clone(descriptor),
            _ => {
                warn!(id, "container did not hold outfit content");
                return Ref::empty();
            }
        };

        let flairs = FlairLoader::new(Arc::clone(&self.service));
        let mut pieces = Vec::with_capacity(descriptor.pieces.len());
        for piece in &descriptor.pieces {
            let flair = flairs.load(&piece.flair_id, lod).await;
            if !flair.is_alive() {
                warn!(outfit = id, flair = %piece.flair_id, "outfit piece did not resolve");
            }
            pieces.push(OutfitPiece {
                slot: piece.slot.clone(),
                flair,
            });
        }

        let asset = OutfitAsset {
            id: id.to_string(),
            lod: lod.clone(),
            pieces,
        };
        Ref::from_dependent_resource(asset, container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use wardrobe_core::Color;

    use crate::asset::{
        FlairDescriptor, MaterialDescriptor, OutfitDescriptor, OutfitPieceDescriptor,
        PaletteEntry, TextureData, TextureFormat,
    };
    use crate::error::FetchError;

    /// Fetch service double: records every request and hands out clones of
    /// one configured container ref.
    #[derive(Default)]
    struct SpyService {
        requests: Mutex<Vec<FetchRequest>>,
        content: Mutex<Option<Ref<RawContent>>>,
        fail: bool,
    }

    impl SpyService {
        fn with_content(content: Ref<RawContent>) -> Self {
            Self {
                content: Mutex::new(Some(content)),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().len()
        }

        fn drop_content(&self) {
            self.content.lock().take();
        }
    }

    impl FetchService for SpyService {
        async fn fetch(
            &self,
            request: FetchRequest,
        ) -> Result<Option<Ref<RawContent>>, FetchError> {
            self.requests.lock().push(request);
            if self.fail {
                return Err(FetchError::Io(
                    PathBuf::from("spy"),
                    std::io::Error::other("injected failure"),
                ));
            }
            Ok(self.content.lock().clone())
        }
    }

    fn released_counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn material_container(
        palette: Vec<PaletteEntry>,
        released: &Arc<AtomicUsize>,
    ) -> Ref<RawContent> {
        let released = Arc::clone(released);
        Ref::with_release(
            RawContent::Material(Arc::new(MaterialDescriptor {
                shader: "standard".to_string(),
                palette,
                textures: vec![],
            })),
            move || {
                released.fetch_add(1, Ordering::SeqCst);
            },
        )
    }

    #[tokio::test]
    async fn blank_id_returns_dead_ref_without_fetching() {
        let spy = Arc::new(SpyService::default());
        let loader = MaterialLoader::new(Arc::clone(&spy));

        let empty = loader.load("", &Lod::default()).await;
        let spaces = loader.load("   ", &Lod::default()).await;

        assert!(!empty.is_alive());
        assert!(!spaces.is_alive());
        assert_eq!(spy.request_count(), 0);
    }

    #[tokio::test]
    async fn not_found_returns_dead_ref() {
        let spy = Arc::new(SpyService::default());
        let loader = MaterialLoader::new(Arc::clone(&spy));

        let missing = loader.load("hat_01", &Lod::default()).await;

        assert!(!missing.is_alive());
        assert_eq!(spy.request_count(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_normalizes_to_dead_ref() {
        let spy = Arc::new(SpyService::failing());
        let loader = MaterialLoader::new(Arc::clone(&spy));

        let failed = loader.load("hat_01", &Lod::default()).await;

        assert!(!failed.is_alive());
        assert_eq!(spy.request_count(), 1);
    }

    #[tokio::test]
    async fn successful_load_echoes_id_and_lod() {
        let released = released_counter();
        let spy = Arc::new(SpyService::with_content(material_container(
            vec![],
            &released,
        )));
        let loader = MaterialLoader::new(Arc::clone(&spy));

        let mut asset = loader.load("hat_01", &Lod::default()).await;
        {
            let item = asset.item().unwrap();
            assert_eq!(item.id, "hat_01");
            assert_eq!(item.lod, Lod::default());
            assert_eq!(item.material.shader, "standard");
        }

        asset.dispose();
        assert!(!asset.is_alive());
    }

    #[tokio::test]
    async fn derived_asset_keeps_container_alive() {
        let released = released_counter();
        let spy = Arc::new(SpyService::with_content(material_container(
            vec![PaletteEntry {
                name: "primary".to_string(),
                color: Color::RED,
            }],
            &released,
        )));
        let loader = ColorLoader::new(Arc::clone(&spy));

        let mut color = loader.load_slot("hat_01", "primary", &Lod::default()).await;
        assert_eq!(color.item().unwrap().color, Color::RED);

        // The spy's master hold goes away; the derived asset still pins
        // the container.
        spy.drop_content();
        assert_eq!(released.load(Ordering::SeqCst), 0);

        color.dispose();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_palette_slot_releases_container() {
        let released = released_counter();
        let spy = Arc::new(SpyService::with_content(material_container(
            vec![],
            &released,
        )));
        let loader = ColorLoader::new(Arc::clone(&spy));

        let missing = loader.load_slot("hat_01", "primary", &Lod::default()).await;
        assert!(!missing.is_alive());

        spy.drop_content();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blend_shape_channel_extraction() {
        use crate::asset::{BlendShapeChannel, BlendShapeData};

        let container = Ref::from_any(RawContent::BlendShapes(Arc::new(BlendShapeData {
            channels: vec![BlendShapeChannel {
                name: "smile".to_string(),
                weight: 0.4,
            }],
        })));
        let spy = Arc::new(SpyService::with_content(container));
        let loader = BlendShapeLoader::new(Arc::clone(&spy));

        let smile = loader.load_slot("face_01", "smile", &Lod::default()).await;
        assert_eq!(smile.item().unwrap().weight, 0.4);

        let frown = loader.load_slot("face_01", "frown", &Lod::default()).await;
        assert!(!frown.is_alive());
    }

    #[tokio::test]
    async fn texture_load_shares_pixel_data() {
        let released = released_counter();
        let hook = Arc::clone(&released);
        let container = Ref::with_release(
            RawContent::Texture(Arc::new(TextureData {
                width: 2,
                height: 2,
                data: vec![0; 16],
                format: TextureFormat::Rgba8,
            })),
            move || {
                hook.fetch_add(1, Ordering::SeqCst);
            },
        );
        let spy = Arc::new(SpyService::with_content(container));
        let loader = Texture2DLoader::new(Arc::clone(&spy));

        let texture = loader.load("skin_01", &Lod::new("High")).await;
        let item = texture.item().unwrap();
        assert_eq!(item.lod, Lod::new("High"));
        assert_eq!(item.texture.width, 2);

        spy.drop_content();
        drop(texture);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn mismatched_container_kind_is_dead_ref() {
        let released = released_counter();
        let spy = Arc::new(SpyService::with_content(material_container(
            vec![],
            &released,
        )));
        let loader = Texture2DLoader::new(Arc::clone(&spy));

        let wrong = loader.load("hat_01", &Lod::default()).await;
        assert!(!wrong.is_alive());
    }

    #[tokio::test]
    async fn outfit_resolves_pieces_and_degrades_on_missing_flair() {
        struct OutfitService {
            released: Arc<AtomicUsize>,
        }

        impl FetchService for OutfitService {
            async fn fetch(
                &self,
                request: FetchRequest,
            ) -> Result<Option<Ref<RawContent>>, FetchError> {
                match request.kind {
                    AssetKind::Outfit => Ok(Some(Ref::from_any(RawContent::Outfit(Arc::new(
                        OutfitDescriptor {
                            pieces: vec![
                                OutfitPieceDescriptor {
                                    slot: "head".to_string(),
                                    flair_id: "hat_01".to_string(),
                                },
                                OutfitPieceDescriptor {
                                    slot: "hands".to_string(),
                                    flair_id: "gloves_99".to_string(),
                                },
                            ],
                        },
                    ))))),
                    AssetKind::Flair if request.id == "hat_01" => {
                        let released = Arc::clone(&self.released);
                        Ok(Some(Ref::with_release(
                            RawContent::Flair(Arc::new(FlairDescriptor {
                                display_name: "Hat".to_string(),
                                category: "headwear".to_string(),
                                material_id: None,
                            })),
                            move || {
                                released.fetch_add(1, Ordering::SeqCst);
                            },
                        )))
                    }
                    _ => Ok(None),
                }
            }
        }

        let released = released_counter();
        let service = Arc::new(OutfitService {
            released: Arc::clone(&released),
        });
        let loader = OutfitLoader::new(service);

        let mut outfit = loader.load("casual_set", &Lod::default()).await;
        {
            let item = outfit.item().unwrap();
            assert_eq!(item.id, "casual_set");
            assert_eq!(item.pieces.len(), 2);
            assert!(item.pieces[0].flair.is_alive());
            assert!(!item.pieces[1].flair.is_alive());
        }

        outfit.dispose();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_loads_release_shared_payload_exactly_once() {
        let released = released_counter();
        let spy = Arc::new(SpyService::with_content(material_container(
            vec![],
            &released,
        )));
        let loader = Arc::new(MaterialLoader::new(Arc::clone(&spy)));

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let loader = Arc::clone(&loader);
            tasks.push(tokio::spawn(async move {
                loader.load("hat_01", &Lod::default()).await
            }));
        }

        let mut refs = Vec::new();
        for task in tasks {
            refs.push(task.await.unwrap());
        }

        assert_eq!(spy.request_count(), 10);
        assert!(refs.iter().all(Ref::is_alive));

        // Each load was an independent fetch sharing one payload.
        spy.drop_content();
        assert_eq!(released.load(Ordering::SeqCst), 0);

        for mut handle in refs {
            handle.dispose();
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
