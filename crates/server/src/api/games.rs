use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::watched::ErrorResponse;
use crate::state::AppState;
use reelog_core::{ExternalCatalogError, GameSearchResult};

#[derive(Debug, Deserialize)]
pub struct GameSearchQuery {
    pub query: String,
}

#[derive(Serialize)]
pub struct GameSearchResponse {
    pub results: Vec<GameSearchResult>,
}

/// Search the game catalog.
pub async fn search_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GameSearchQuery>,
) -> Result<Json<GameSearchResponse>, impl IntoResponse> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "query must not be empty".to_string(),
            }),
        ));
    }

    match state.games().search(query).await {
        Ok(results) => Ok(Json(GameSearchResponse { results })),
        Err(e) => {
            warn!("Game search for '{}' failed: {}", query, e);
            let (status, message) = match e {
                ExternalCatalogError::MissingConfig(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "game catalog not configured",
                ),
                ExternalCatalogError::NotFound(_) => (StatusCode::NOT_FOUND, "no games found"),
                _ => (StatusCode::BAD_GATEWAY, "game catalog unavailable"),
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: message.to_string(),
                }),
            ))
        }
    }
}
