use nowwatching_models::MediaKind;
use nowwatching_sources::{ImageCatalog, ImageTarget, SourceError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedImage {
    source_url: String,
    image_url: String,
}

/// Last resolved display image per kind, keyed by the lookup URL that produced it.
#[derive(Debug, Default)]
pub struct ImageCache {
    slots: HashMap<MediaKind, CachedImage>,
}

impl ImageCache {
    pub fn get(&self, kind: MediaKind, source_url: &str) -> Option<&str> {
        self.slots
            .get(&kind)
            .filter(|cached| cached.source_url == source_url)
            .map(|cached| cached.image_url.as_str())
    }

    pub fn store(&mut self, kind: MediaKind, source_url: String, image_url: String) {
        self.slots.insert(kind, CachedImage { source_url, image_url });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

pub struct ImageResolver {
    catalog: Arc<dyn ImageCatalog>,
    cache: ImageCache,
}

impl ImageResolver {
    pub fn new(catalog: Arc<dyn ImageCatalog>) -> Self {
        Self {
            catalog,
            cache: ImageCache::default(),
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Display URL for `target`, or `None` when the catalog has no image for it.
    ///
    /// Only found images are cached; an empty result is looked up again next time.
    pub async fn resolve(&mut self, kind: MediaKind, target: &ImageTarget) -> Result<Option<String>, SourceError> {
        let url = self.catalog.lookup_url(target);
        if let Some(image_url) = self.cache.get(kind, &url) {
            debug!(operation = "image_lookup", %kind, "Cache hit");
            return Ok(Some(image_url.to_string()));
        }

        let images = self.catalog.fetch_images(&url).await?;
        let Some(image) = images.first() else {
            debug!(operation = "image_lookup", %kind, "No backdrops, posters or stills");
            return Ok(None);
        };

        let image_url = self.catalog.display_url(&image.file_path);
        self.cache.store(kind, url, image_url.clone());
        Ok(Some(image_url))
    }
}
