//! Resolve-or-populate front for the content store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{ContentRecord, ContentStore, InsertOutcome, NewContent, ResolveError};
use crate::external_catalog::{ExternalCatalogError, MediaKind, MetadataCatalog};
use crate::images::PosterDownloader;
use crate::metrics;

/// Resolves catalog ids to cached content, fetching from the catalog on a
/// miss.
pub struct ContentCache {
    store: Arc<dyn ContentStore>,
    catalog: Arc<dyn MetadataCatalog>,
    posters: Option<PosterDownloader>,
}

impl ContentCache {
    pub fn new(store: Arc<dyn ContentStore>, catalog: Arc<dyn MetadataCatalog>) -> Self {
        Self {
            store,
            catalog,
            posters: None,
        }
    }

    /// Download posters of newly cached titles in the background.
    pub fn with_posters(mut self, posters: PosterDownloader) -> Self {
        self.posters = Some(posters);
        self
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Return the cached title for `(kind, external_id)`, fetching and
    /// persisting it first if no one has referenced it yet.
    ///
    /// Concurrent callers for the same uncached title may all fetch; only
    /// one row is created and every caller gets that row back.
    pub async fn resolve_or_create(
        &self,
        kind: MediaKind,
        external_id: u32,
    ) -> Result<ContentRecord, ResolveError> {
        if let Some(record) = self
            .store
            .find(external_id, kind)
            .map_err(|e| ResolveError::Persist(e.to_string()))?
        {
            metrics::CONTENT_CACHE_LOOKUPS
                .with_label_values(&["hit"])
                .inc();
            debug!("Content cache hit: {} {}", kind, external_id);
            return Ok(record);
        }

        metrics::CONTENT_CACHE_LOOKUPS
            .with_label_values(&["miss"])
            .inc();
        debug!("Content cache miss: {} {}, fetching", kind, external_id);

        let metadata = self
            .catalog
            .fetch(kind, external_id)
            .await
            .map_err(|e| match e {
                ExternalCatalogError::NotFound(msg) => ResolveError::NotFound(msg),
                other => ResolveError::UpstreamUnavailable(other.to_string()),
            })?;

        let content = NewContent::from(metadata);
        if !content.is_usable() {
            return Err(ResolveError::NotFound(format!(
                "catalog returned no usable data for {} {}",
                kind, external_id
            )));
        }
        // Rows are keyed by the requested id; a different one would never hit.
        if content.external_id != external_id || content.kind != kind {
            warn!(
                "Catalog answered {} {} with {} {}, not caching",
                kind, external_id, content.kind, content.external_id
            );
            return Err(ResolveError::NotFound(format!(
                "catalog returned a different title for {} {}",
                kind, external_id
            )));
        }

        let outcome = self
            .store
            .insert_or_get(&content)
            .map_err(|e| ResolveError::Persist(e.to_string()))?;

        match outcome {
            InsertOutcome::Inserted(record) => {
                info!(
                    "Cached {} {} '{}' as content {}",
                    kind, external_id, record.title, record.id
                );
                self.fetch_poster(&record);
                Ok(record)
            }
            InsertOutcome::Existing(record) => {
                metrics::CONTENT_CACHE_LOOKUPS
                    .with_label_values(&["race"])
                    .inc();
                debug!(
                    "Content {} {} was cached concurrently as {}",
                    kind, external_id, record.id
                );
                Ok(record)
            }
        }
    }

    fn fetch_poster(&self, record: &ContentRecord) {
        let Some(posters) = &self.posters else {
            return;
        };
        if record.poster_path.is_empty() {
            return;
        }
        if let Err(e) = posters.destination(&record.poster_path) {
            warn!("Not downloading poster for content {}: {}", record.id, e);
            return;
        }
        posters.spawn(&record.poster_path);
    }
}
