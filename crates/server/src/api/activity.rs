use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::watched::ErrorResponse;
use crate::state::AppState;
use reelog_core::{ActivityEntry, ActivityFilter, ActivityKind};

const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub watched_id: Option<i64>,
    pub kind: Option<ActivityKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct ActivityResponse {
    pub entries: Vec<ActivityEntry>,
    pub total: i64,
}

/// A user's activity feed, newest first.
pub async fn list_activity(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>, impl IntoResponse> {
    let mut filter = ActivityFilter::new().with_user_id(user_id);
    if let Some(watched_id) = params.watched_id {
        filter = filter.with_watched_id(watched_id);
    }
    if let Some(kind) = params.kind {
        filter = filter.with_kind(kind);
    }
    if let Some(limit) = params.limit {
        filter = filter.with_limit(limit.clamp(1, MAX_LIMIT));
    }
    if let Some(offset) = params.offset {
        filter = filter.with_offset(offset.max(0));
    }

    let store = state.activity_store();
    let result = store
        .query(&filter)
        .and_then(|entries| Ok((entries, store.count(&filter)?)));

    match result {
        Ok((entries, total)) => Ok(Json(ActivityResponse { entries, total })),
        Err(e) => {
            error!("Failed to query activity: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to load activity".to_string(),
                }),
            ))
        }
    }
}
