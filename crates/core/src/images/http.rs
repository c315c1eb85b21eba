//! reqwest-backed image fetcher.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::fs;
use tracing::debug;

use super::{ImageError, ImageFetcher};

/// Downloads images over HTTP and writes them with `tokio::fs`.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, ImageError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn download(&self, url: &str, destination: &Path) -> Result<(), ImageError> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ImageError::DirectoryCreationFailed {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
            }
        }

        debug!("Downloading {} to {}", url, destination.display());

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(ImageError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        fs::write(destination, &bytes)
            .await
            .map_err(|e| ImageError::WriteFailed {
                path: destination.to_path_buf(),
                source: e,
            })
    }
}
