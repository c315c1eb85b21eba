//! Types for the content cache.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::external_catalog::{CatalogMetadata, MediaKind, MovieMetadata, ShowMetadata};

/// A title cached from the external catalog, shared by all users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentRecord {
    /// Local id.
    pub id: i64,
    /// Id in the external catalog.
    pub external_id: u32,
    pub kind: MediaKind,
    pub title: String,
    pub overview: String,
    pub poster_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    pub popularity: f32,
    pub vote_average: f32,
    pub vote_count: u32,
    /// IMDb id (movies only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// Lifecycle status reported by the catalog.
    pub status: String,
    /// Zero for shows.
    pub budget: u64,
    /// Zero for shows.
    pub revenue: u64,
    pub created_at: DateTime<Utc>,
}

/// A content row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub external_id: u32,
    pub kind: MediaKind,
    pub title: String,
    pub overview: String,
    pub poster_path: String,
    pub release_date: Option<NaiveDate>,
    pub popularity: f32,
    pub vote_average: f32,
    pub vote_count: u32,
    pub imdb_id: Option<String>,
    pub status: String,
    pub budget: u64,
    pub revenue: u64,
}

impl NewContent {
    /// Upstream data without an id or a title is not cached.
    pub fn is_usable(&self) -> bool {
        self.external_id != 0 && !self.title.trim().is_empty()
    }

    pub(crate) fn into_record(self, id: i64, created_at: DateTime<Utc>) -> ContentRecord {
        ContentRecord {
            id,
            external_id: self.external_id,
            kind: self.kind,
            title: self.title,
            overview: self.overview,
            poster_path: self.poster_path,
            release_date: self.release_date,
            popularity: self.popularity,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            imdb_id: self.imdb_id,
            status: self.status,
            budget: self.budget,
            revenue: self.revenue,
            created_at,
        }
    }
}

impl From<MovieMetadata> for NewContent {
    fn from(m: MovieMetadata) -> Self {
        Self {
            external_id: m.id,
            kind: MediaKind::Movie,
            title: m.title,
            overview: m.overview,
            poster_path: m.poster_path,
            release_date: m.release_date,
            popularity: m.popularity,
            vote_average: m.vote_average,
            vote_count: m.vote_count,
            imdb_id: m.imdb_id,
            status: m.status,
            budget: m.budget,
            revenue: m.revenue,
        }
    }
}

impl From<ShowMetadata> for NewContent {
    fn from(s: ShowMetadata) -> Self {
        Self {
            external_id: s.id,
            kind: MediaKind::Show,
            title: s.name,
            overview: s.overview,
            poster_path: s.poster_path,
            release_date: s.first_air_date,
            popularity: s.popularity,
            vote_average: s.vote_average,
            vote_count: s.vote_count,
            imdb_id: None,
            status: s.status,
            budget: 0,
            revenue: 0,
        }
    }
}

impl From<CatalogMetadata> for NewContent {
    fn from(metadata: CatalogMetadata) -> Self {
        match metadata {
            CatalogMetadata::Movie(m) => m.into(),
            CatalogMetadata::Show(s) => s.into(),
        }
    }
}

/// Result of [`ContentStore::insert_or_get`](super::ContentStore::insert_or_get).
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// This call created the row.
    Inserted(ContentRecord),
    /// Another caller created the row first; this is the canonical one.
    Existing(ContentRecord),
}

impl InsertOutcome {
    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }

    pub fn into_record(self) -> ContentRecord {
        match self {
            InsertOutcome::Inserted(r) | InsertOutcome::Existing(r) => r,
        }
    }
}

/// Errors for content storage operations.
#[derive(Debug, Error)]
pub enum ContentStoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors from resolving a title through the cache.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The catalog does not know the title, or returned unusable data.
    #[error("Content not found: {0}")]
    NotFound(String),

    /// The catalog request failed.
    #[error("Catalog unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The content row could not be stored or read.
    #[error("Failed to persist content: {0}")]
    Persist(String),
}
