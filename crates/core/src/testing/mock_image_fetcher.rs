//! Mock image fetcher for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::images::{ImageError, ImageFetcher};

/// Mock implementation of the ImageFetcher trait.
///
/// Records `(url, destination)` pairs without touching the network or the
/// filesystem.
#[derive(Debug)]
pub struct MockImageFetcher {
    downloads: Arc<RwLock<Vec<(String, PathBuf)>>>,
    next_error: Arc<RwLock<Option<ImageError>>>,
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageFetcher {
    pub fn new() -> Self {
        Self {
            downloads: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded downloads.
    pub async fn recorded_downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.read().await.clone()
    }

    /// Configure the next download to fail with the given error.
    pub async fn set_next_error(&self, error: ImageError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn download(&self, url: &str, destination: &Path) -> Result<(), ImageError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.downloads
            .write()
            .await
            .push((url.to_string(), destination.to_path_buf()));
        Ok(())
    }
}
