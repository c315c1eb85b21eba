//! Error types for the images module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while downloading an image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// HTTP request failed before a response was received.
    #[error("Image request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with something other than 200.
    #[error("Image request to {url} returned {status}")]
    Status { url: String, status: u16 },

    /// Failed to create the destination directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the image file.
    #[error("Failed to write image: {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Poster path would escape the image directory.
    #[error("Refusing poster path: {0}")]
    InvalidPath(String),
}
