//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::types::{CatalogMetadata, MediaKind, MovieMetadata, ShowMetadata};
use super::{ExternalCatalogError, MetadataCatalog};
use crate::metrics;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
}

impl TmdbConfig {
    /// Image base URL, falling back to the public TMDB CDN.
    pub fn image_base_url(&self) -> &str {
        self.image_base_url
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, ExternalCatalogError> {
        if config.api_key.is_empty() {
            return Err(ExternalCatalogError::MissingConfig(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Get a specific movie by TMDB ID.
    pub async fn get_movie(&self, tmdb_id: u32) -> Result<MovieMetadata, ExternalCatalogError> {
        let details: TmdbMovieDetails = self.get_details(MediaKind::Movie, tmdb_id).await?;
        Ok(details.into())
    }

    /// Get a specific TV series by TMDB ID.
    pub async fn get_show(&self, tmdb_id: u32) -> Result<ShowMetadata, ExternalCatalogError> {
        let details: TmdbTvDetails = self.get_details(MediaKind::Show, tmdb_id).await?;
        Ok(details.into())
    }

    async fn get_details<T: DeserializeOwned>(
        &self,
        kind: MediaKind,
        tmdb_id: u32,
    ) -> Result<T, ExternalCatalogError> {
        let url = format!("{}/{}/{}", self.base_url, kind.tmdb_path(), tmdb_id);

        debug!("TMDB get {}: id={}", kind, tmdb_id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        let response = check_status(response, || format!("{} ID {}", kind, tmdb_id)).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ExternalCatalogError::Decode(format!("Failed to parse {} response: {}", kind, e))
        })
    }
}

#[async_trait]
impl MetadataCatalog for TmdbClient {
    async fn fetch(
        &self,
        kind: MediaKind,
        external_id: u32,
    ) -> Result<CatalogMetadata, ExternalCatalogError> {
        let result = match kind {
            MediaKind::Movie => self.get_movie(external_id).await.map(CatalogMetadata::Movie),
            MediaKind::Show => self.get_show(external_id).await.map(CatalogMetadata::Show),
        };

        let label = match &result {
            Ok(_) => "ok",
            Err(e) => e.label(),
        };
        metrics::CATALOG_REQUESTS
            .with_label_values(&["tmdb", label])
            .inc();

        result
    }
}

/// Map a non-2xx response to the matching error, keeping the raw body.
async fn check_status(
    response: Response,
    describe: impl FnOnce() -> String,
) -> Result<Response, ExternalCatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == 404 {
        return Err(ExternalCatalogError::NotFound(describe()));
    }
    Err(ExternalCatalogError::Upstream {
        status: status.as_u16(),
        body,
    })
}

/// TMDB dates are `YYYY-MM-DD`; empty or malformed values become `None`.
fn parse_tmdb_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            debug!("Ignoring unparseable TMDB date '{}': {}", value, e);
            None
        }
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

// Identity fields decode leniently: a missing or null id/title becomes a
// zero value and the content cache rejects it as unusable.

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: Option<u32>,
    title: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
    popularity: Option<f32>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
    imdb_id: Option<String>,
    status: Option<String>,
    budget: Option<u64>,
    revenue: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvDetails {
    id: Option<u32>,
    name: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    first_air_date: Option<String>,
    popularity: Option<f32>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
    status: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<TmdbMovieDetails> for MovieMetadata {
    fn from(d: TmdbMovieDetails) -> Self {
        Self {
            id: d.id.unwrap_or_default(),
            title: d.title.unwrap_or_default(),
            overview: d.overview.unwrap_or_default(),
            poster_path: d.poster_path.unwrap_or_default(),
            release_date: parse_tmdb_date(d.release_date.as_deref()),
            popularity: d.popularity.unwrap_or(0.0),
            vote_average: d.vote_average.unwrap_or(0.0),
            vote_count: d.vote_count.unwrap_or(0),
            imdb_id: d.imdb_id.filter(|id| !id.is_empty()),
            status: d.status.unwrap_or_default(),
            budget: d.budget.unwrap_or(0),
            revenue: d.revenue.unwrap_or(0),
        }
    }
}

impl From<TmdbTvDetails> for ShowMetadata {
    fn from(d: TmdbTvDetails) -> Self {
        Self {
            id: d.id.unwrap_or_default(),
            name: d.name.unwrap_or_default(),
            overview: d.overview.unwrap_or_default(),
            poster_path: d.poster_path.unwrap_or_default(),
            first_air_date: parse_tmdb_date(d.first_air_date.as_deref()),
            popularity: d.popularity.unwrap_or(0.0),
            vote_average: d.vote_average.unwrap_or(0.0),
            vote_count: d.vote_count.unwrap_or(0),
            status: d.status.unwrap_or_default(),
        }
    }
}
