//! Mock metadata catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::external_catalog::{CatalogMetadata, ExternalCatalogError, MediaKind, MetadataCatalog};

/// A recorded fetch for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFetch {
    pub kind: MediaKind,
    pub external_id: u32,
}

/// Mock implementation of the MetadataCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable movie/show metadata
/// - Count and record fetches
/// - Simulate failures and slow responses
#[derive(Debug)]
pub struct MockMetadataCatalog {
    /// Metadata by (kind, id).
    entries: Arc<RwLock<HashMap<(MediaKind, u32), CatalogMetadata>>>,
    /// Recorded fetches.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    fetch_count: AtomicUsize,
    /// Latency applied to every fetch.
    delay: Option<Duration>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<ExternalCatalogError>>>,
}

impl Default for MockMetadataCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMetadataCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            fetch_count: AtomicUsize::new(0),
            delay: None,
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Delay every fetch, widening the window for concurrent callers.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add movie or show metadata.
    pub async fn add_metadata(&self, metadata: CatalogMetadata) {
        self.entries
            .write()
            .await
            .insert((metadata.kind(), metadata.id()), metadata);
    }

    /// Number of fetches performed, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Get all recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: ExternalCatalogError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<ExternalCatalogError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl MetadataCatalog for MockMetadataCatalog {
    async fn fetch(
        &self,
        kind: MediaKind,
        external_id: u32,
    ) -> Result<CatalogMetadata, ExternalCatalogError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.fetches
            .write()
            .await
            .push(RecordedFetch { kind, external_id });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.entries
            .read()
            .await
            .get(&(kind, external_id))
            .cloned()
            .ok_or_else(|| {
                ExternalCatalogError::NotFound(format!("{} {} not found", kind, external_id))
            })
    }
}
