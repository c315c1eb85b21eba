//! Poster image downloads.
//!
//! The content cache hands poster paths to a [`PosterDownloader`], which
//! runs the download in the background through an [`ImageFetcher`].
//! Failures never reach the caller; they are logged and counted.

mod error;
mod http;
mod poster;

pub use error::ImageError;
pub use http::HttpImageFetcher;
pub use poster::{PosterDownloader, POSTER_SIZE};

use std::path::Path;

use async_trait::async_trait;

/// Fetches an image from a URL into a local file.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download `url` to `destination`, creating parent directories.
    ///
    /// Any non-200 response is an error.
    async fn download(&self, url: &str, destination: &Path) -> Result<(), ImageError>;
}
