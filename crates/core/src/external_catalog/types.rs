//! Types for external catalog API responses.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Media kind
// ============================================================================

/// Kind of title served by the movie/show catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    #[serde(alias = "tv")]
    Show,
}

impl MediaKind {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "show",
        }
    }

    /// Path segment used by the TMDB API for this kind.
    pub fn tmdb_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaKind::Movie),
            "show" | "tv" => Ok(MediaKind::Show),
            other => Err(format!("unknown media kind: {}", other)),
        }
    }
}

// ============================================================================
// TMDB metadata
// ============================================================================

/// Metadata returned for a single title, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogMetadata {
    Movie(MovieMetadata),
    Show(ShowMetadata),
}

impl CatalogMetadata {
    pub fn kind(&self) -> MediaKind {
        match self {
            CatalogMetadata::Movie(_) => MediaKind::Movie,
            CatalogMetadata::Show(_) => MediaKind::Show,
        }
    }

    /// External catalog id of the title.
    pub fn id(&self) -> u32 {
        match self {
            CatalogMetadata::Movie(m) => m.id,
            CatalogMetadata::Show(s) => s.id,
        }
    }
}

/// A TMDB movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieMetadata {
    /// TMDB movie ID.
    pub id: u32,
    /// Movie title.
    pub title: String,
    #[serde(default)]
    pub overview: String,
    /// Poster path (relative to TMDB image base URL).
    #[serde(default)]
    pub poster_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub popularity: f32,
    /// Average vote (0-10).
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// Lifecycle status ("Released", "Post Production", ...).
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
}

/// A TMDB TV series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowMetadata {
    /// TMDB series ID.
    pub id: u32,
    /// Series name.
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<NaiveDate>,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    /// Lifecycle status ("Returning Series", "Ended", ...).
    #[serde(default)]
    pub status: String,
}

// ============================================================================
// IGDB types
// ============================================================================

/// A game returned by an IGDB search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSearchResult {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<GameCover>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Unix timestamp (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_release_date: Option<i64>,
}

/// Cover image reference of an IGDB game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameCover {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
}
