//! Background poster downloads for newly cached titles.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{ImageError, ImageFetcher};
use crate::metrics;

/// Catalog image size requested for posters.
pub const POSTER_SIZE: &str = "w500";

/// Maps poster paths to a URL and a file under the image directory, and
/// downloads them in the background.
#[derive(Clone)]
pub struct PosterDownloader {
    fetcher: Arc<dyn ImageFetcher>,
    base_url: String,
    dir: PathBuf,
}

impl PosterDownloader {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        base_url: impl Into<String>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dir: dir.into(),
        }
    }

    /// Remote URL of a poster, e.g. `{base}/w500/abc.jpg`.
    pub fn poster_url(&self, poster_path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            POSTER_SIZE,
            poster_path.trim_start_matches('/')
        )
    }

    /// Local file for a poster. Only plain path components are accepted.
    pub fn destination(&self, poster_path: &str) -> Result<PathBuf, ImageError> {
        let relative = Path::new(poster_path.trim_start_matches('/'));

        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !plain || relative.as_os_str().is_empty() {
            return Err(ImageError::InvalidPath(poster_path.to_string()));
        }

        Ok(self.dir.join(relative))
    }

    /// Download a poster and wait for it.
    pub async fn download(&self, poster_path: &str) -> Result<PathBuf, ImageError> {
        let destination = match self.destination(poster_path) {
            Ok(d) => d,
            Err(e) => {
                metrics::IMAGE_DOWNLOADS.with_label_values(&["skipped"]).inc();
                return Err(e);
            }
        };
        let url = self.poster_url(poster_path);

        match self.fetcher.download(&url, &destination).await {
            Ok(()) => {
                metrics::IMAGE_DOWNLOADS.with_label_values(&["success"]).inc();
                debug!("Saved poster {} to {}", url, destination.display());
                Ok(destination)
            }
            Err(e) => {
                metrics::IMAGE_DOWNLOADS.with_label_values(&["failed"]).inc();
                Err(e)
            }
        }
    }

    /// Download a poster in the background. Failures are logged only.
    pub fn spawn(&self, poster_path: &str) -> JoinHandle<()> {
        let downloader = self.clone();
        let poster_path = poster_path.to_string();

        tokio::spawn(async move {
            if let Err(e) = downloader.download(&poster_path).await {
                warn!("Poster download for '{}' failed: {}", poster_path, e);
            }
        })
    }
}
