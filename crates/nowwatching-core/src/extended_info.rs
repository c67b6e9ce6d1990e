use nowwatching_models::{MediaKind, MediaReference};
use nowwatching_sources::trakt::api::{extended_info_path, parse_extended};
use nowwatching_sources::{AuthenticatedRequest, SourceError};
use reqwest::Method;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedRecord {
    id: String,
    record: MediaReference,
}

/// Last resolved `extended=full` record per kind.
///
/// Holds at most one record for each of episode, show and movie. A lookup
/// for a different identifier replaces the slot, so the cache only helps while
/// the same item keeps being polled.
#[derive(Debug, Default)]
pub struct ExtendedInfoCache {
    slots: HashMap<MediaKind, CachedRecord>,
}

impl ExtendedInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: MediaKind, id: &str) -> Option<&MediaReference> {
        self.slots
            .get(&kind)
            .filter(|cached| cached.id == id)
            .map(|cached| &cached.record)
    }

    pub fn store(&mut self, kind: MediaKind, id: String, record: MediaReference) {
        self.slots.insert(kind, CachedRecord { id, record });
    }

    /// Identifier currently held for `kind`.
    pub fn cached_id(&self, kind: MediaKind) -> Option<&str> {
        self.slots.get(&kind).map(|cached| cached.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ExtendedInfoResolver {
    cache: ExtendedInfoCache,
}

impl ExtendedInfoResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &ExtendedInfoCache {
        &self.cache
    }

    /// Full record for `kind`/`id`, from the cache when the slot holds the same id.
    /// On failure the existing slot is left as it was.
    pub async fn resolve(
        &mut self,
        api: &dyn AuthenticatedRequest,
        kind: MediaKind,
        id: &str,
    ) -> Result<MediaReference, SourceError> {
        if let Some(record) = self.cache.get(kind, id) {
            debug!(operation = "extended_info", %kind, id, "Cache hit");
            return Ok(record.clone());
        }

        debug!(operation = "extended_info", %kind, id, "Cache miss, fetching summary");
        let response = api.request(Method::GET, &extended_info_path(kind, id)).await?;
        let record = parse_extended(kind, response.body.as_ref())?;

        self.cache.store(kind, id.to_string(), record.clone());
        Ok(record)
    }
}
