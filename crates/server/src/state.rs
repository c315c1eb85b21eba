//! Application state shared across handlers.

use std::sync::Arc;

use reelog_core::{
    ActivityStore, Config, ContentStore, GameCatalog, SanitizedConfig, WatchedService,
};

/// Shared application state.
pub struct AppState {
    /// Application configuration.
    config: Config,
    /// Watched list operations.
    watched: Arc<WatchedService>,
    /// Cached content, read for metrics.
    content: Arc<dyn ContentStore>,
    /// Activity log, queried directly for the activity feed.
    activity: Arc<dyn ActivityStore>,
    /// Game search (IGDB).
    games: Arc<dyn GameCatalog>,
}

impl AppState {
    pub fn new(
        config: Config,
        watched: Arc<WatchedService>,
        content: Arc<dyn ContentStore>,
        activity: Arc<dyn ActivityStore>,
        games: Arc<dyn GameCatalog>,
    ) -> Self {
        Self {
            config,
            watched,
            content,
            activity,
            games,
        }
    }

    /// Get sanitized config for API responses.
    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn watched(&self) -> &WatchedService {
        &self.watched
    }

    pub fn content_store(&self) -> &dyn ContentStore {
        self.content.as_ref()
    }

    pub fn activity_store(&self) -> &dyn ActivityStore {
        self.activity.as_ref()
    }

    pub fn games(&self) -> &dyn GameCatalog {
        self.games.as_ref()
    }
}
