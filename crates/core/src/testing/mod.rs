//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external collaborators
//! (metadata catalog, game catalog, image fetcher), so the content cache
//! and watched service can be exercised without network access, and a
//! local HTTP stub for testing the real catalog clients.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelog_core::testing::{fixtures, MockMetadataCatalog};
//! use reelog_core::external_catalog::CatalogMetadata;
//!
//! let catalog = MockMetadataCatalog::new();
//! catalog.add_metadata(CatalogMetadata::Movie(fixtures::fight_club())).await;
//!
//! // Use in a ContentCache...
//! assert_eq!(catalog.fetch_count(), 0);
//! ```

mod mock_game_catalog;
mod mock_image_fetcher;
mod mock_metadata_catalog;
mod stub_server;

pub use mock_game_catalog::MockGameCatalog;
pub use mock_image_fetcher::MockImageFetcher;
pub use mock_metadata_catalog::{MockMetadataCatalog, RecordedFetch};
pub use stub_server::{RecordedRequest, StubRoute, StubServer};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::external_catalog::{GameCover, GameSearchResult, MovieMetadata, ShowMetadata};

    /// TMDB movie 550.
    pub fn fight_club() -> MovieMetadata {
        MovieMetadata {
            id: 550,
            title: "Fight Club".to_string(),
            overview: "A ticking-time-bomb insomniac and a slippery soap salesman \
                       channel primal male aggression into a shocking new form of therapy."
                .to_string(),
            poster_path: "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".to_string(),
            release_date: NaiveDate::from_ymd_opt(1999, 10, 15),
            popularity: 61.416,
            vote_average: 8.433,
            vote_count: 26280,
            imdb_id: Some("tt0137523".to_string()),
            status: "Released".to_string(),
            budget: 63_000_000,
            revenue: 100_853_753,
        }
    }

    /// TMDB tv 1396.
    pub fn breaking_bad() -> ShowMetadata {
        ShowMetadata {
            id: 1396,
            name: "Breaking Bad".to_string(),
            overview: "Walter White, diagnosed with terminal cancer, turns to crime."
                .to_string(),
            poster_path: "/ggFHVNu6YYI5L9pCfOacjizRGt.jpg".to_string(),
            first_air_date: NaiveDate::from_ymd_opt(2008, 1, 20),
            popularity: 288.2,
            vote_average: 8.9,
            vote_count: 13500,
            status: "Ended".to_string(),
        }
    }

    /// A movie with reasonable defaults and no poster.
    pub fn movie(id: u32, title: &str) -> MovieMetadata {
        MovieMetadata {
            id,
            title: title.to_string(),
            overview: format!("A movie about {}.", title.to_lowercase()),
            poster_path: String::new(),
            release_date: NaiveDate::from_ymd_opt(2020, 6, 15),
            popularity: 10.0,
            vote_average: 7.0,
            vote_count: 100,
            imdb_id: None,
            status: "Released".to_string(),
            budget: 0,
            revenue: 0,
        }
    }

    /// A game search result.
    pub fn game(id: u64, name: &str) -> GameSearchResult {
        GameSearchResult {
            id,
            name: name.to_string(),
            cover: Some(GameCover {
                id: id * 10,
                image_id: Some(format!("co{}", id)),
            }),
            version_title: None,
            summary: Some(format!("{} summary.", name)),
            first_release_date: Some(1_488_499_200),
        }
    }
}
