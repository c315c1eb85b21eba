//! Mock game catalog for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::external_catalog::{ExternalCatalogError, GameCatalog, GameSearchResult};

/// Mock implementation of the GameCatalog trait.
///
/// Searches match case-insensitively on the game name.
#[derive(Debug)]
pub struct MockGameCatalog {
    games: Arc<RwLock<Vec<GameSearchResult>>>,
    queries: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<ExternalCatalogError>>>,
}

impl Default for MockGameCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGameCatalog {
    pub fn new() -> Self {
        Self {
            games: Arc::new(RwLock::new(Vec::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Add a searchable game.
    pub async fn add_game(&self, game: GameSearchResult) {
        self.games.write().await.push(game);
    }

    /// Get all recorded search queries.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: ExternalCatalogError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl GameCatalog for MockGameCatalog {
    async fn search(&self, query: &str) -> Result<Vec<GameSearchResult>, ExternalCatalogError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.queries.write().await.push(query.to_string());

        let query_lower = query.to_lowercase();
        Ok(self
            .games
            .read()
            .await
            .iter()
            .filter(|g| g.name.to_lowercase().contains(&query_lower))
            .cloned()
            .collect())
    }
}
