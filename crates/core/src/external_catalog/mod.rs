//! External catalog integration for TMDB (movies/shows) and IGDB (games).
//!
//! The content cache talks to a [`MetadataCatalog`] to populate itself on
//! first reference to a title. Game search goes through a [`GameCatalog`],
//! which holds its own bearer credential.

mod credential;
mod igdb;
mod tmdb;
mod types;

pub use credential::{Credential, CredentialHolder};
pub use igdb::{IgdbClient, IgdbConfig};
pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with external catalogs.
#[derive(Debug, Error)]
pub enum ExternalCatalogError {
    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Catalog answered outside the 2xx range.
    #[error("Upstream error: {status} - {body}")]
    Upstream { status: u16, body: String },

    /// HTTP request failed before a response was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode response.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client not configured (missing API key, client id, etc.).
    #[error("Client not configured: {0}")]
    MissingConfig(String),

    /// Credential exchange was rejected.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),
}

impl ExternalCatalogError {
    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ExternalCatalogError::NotFound(_) => "not_found",
            ExternalCatalogError::Upstream { .. } => "upstream",
            ExternalCatalogError::Network(_) => "network",
            ExternalCatalogError::Decode(_) => "decode",
            ExternalCatalogError::MissingConfig(_) => "missing_config",
            ExternalCatalogError::AuthFailed(_) => "auth_failed",
        }
    }
}

/// Source of canonical movie/show metadata.
#[async_trait]
pub trait MetadataCatalog: Send + Sync {
    /// Fetch the metadata of one title by its external id.
    async fn fetch(
        &self,
        kind: MediaKind,
        external_id: u32,
    ) -> Result<CatalogMetadata, ExternalCatalogError>;
}

/// Searchable game catalog.
#[async_trait]
pub trait GameCatalog: Send + Sync {
    /// Search games by free-text query.
    async fn search(&self, query: &str) -> Result<Vec<GameSearchResult>, ExternalCatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_parsing() {
        assert_eq!("movie".parse::<MediaKind>().unwrap(), MediaKind::Movie);
        assert_eq!("show".parse::<MediaKind>().unwrap(), MediaKind::Show);
        assert_eq!("tv".parse::<MediaKind>().unwrap(), MediaKind::Show);
        assert!("game".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_media_kind_serde_accepts_tv_alias() {
        let kind: MediaKind = serde_json::from_str("\"tv\"").unwrap();
        assert_eq!(kind, MediaKind::Show);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"show\"");
    }

    #[test]
    fn test_media_kind_tmdb_path() {
        assert_eq!(MediaKind::Movie.tmdb_path(), "movie");
        assert_eq!(MediaKind::Show.tmdb_path(), "tv");
    }

    #[test]
    fn test_catalog_metadata_accessors() {
        let show = CatalogMetadata::Show(ShowMetadata {
            id: 1396,
            name: "Breaking Bad".to_string(),
            overview: String::new(),
            poster_path: String::new(),
            first_air_date: None,
            popularity: 0.0,
            vote_average: 0.0,
            vote_count: 0,
            status: "Ended".to_string(),
        });

        assert_eq!(show.kind(), MediaKind::Show);
        assert_eq!(show.id(), 1396);
    }

    #[test]
    fn test_error_labels() {
        let err = ExternalCatalogError::Upstream {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.label(), "upstream");
        assert!(err.to_string().contains("boom"));
    }
}
