//! Watched list endpoints.

use std::error::Error as _;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::state::AppState;
use reelog_core::{
    AddWatchedRequest, ResolveError, UpdateWatchedRequest, WatchedError, WatchedRecord,
};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct WatchedListResponse {
    pub entries: Vec<WatchedRecord>,
    pub total: usize,
}

/// HTTP rendering of a [`WatchedError`].
///
/// The body carries only the error's own message; the underlying storage or
/// catalog failure is logged here and never sent to the client.
pub struct ApiError(WatchedError);

impl From<WatchedError> for ApiError {
    fn from(e: WatchedError) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            WatchedError::NotFound => StatusCode::NOT_FOUND,
            WatchedError::AlreadyExists => StatusCode::CONFLICT,
            WatchedError::Invalid(_) => StatusCode::BAD_REQUEST,
            WatchedError::ContentUnavailable(ResolveError::NotFound(_)) => StatusCode::NOT_FOUND,
            WatchedError::ContentUnavailable(ResolveError::UpstreamUnavailable(_)) => {
                StatusCode::BAD_GATEWAY
            }
            WatchedError::ContentUnavailable(ResolveError::Persist(_))
            | WatchedError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Some(source) = self.0.source() {
            if status.is_server_error() {
                error!("{}: {}", self.0, source);
            } else {
                debug!("{}: {}", self.0, source);
            }
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// List a user's watched entries.
pub async fn list_watched(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<WatchedListResponse>, ApiError> {
    let entries = state.watched().list(&user_id)?;
    let total = entries.len();
    Ok(Json(WatchedListResponse { entries, total }))
}

/// Get one watched entry.
pub async fn get_watched(
    State(state): State<Arc<AppState>>,
    Path((user_id, id)): Path<(String, i64)>,
) -> Result<Json<WatchedRecord>, ApiError> {
    let record = state.watched().get(&user_id, id)?;
    Ok(Json(record))
}

/// Add a title to a user's watched list.
pub async fn add_watched(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<AddWatchedRequest>,
) -> Result<(StatusCode, Json<WatchedRecord>), ApiError> {
    let record = state.watched().add(&user_id, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Change status and/or rating of a watched entry.
pub async fn update_watched(
    State(state): State<Arc<AppState>>,
    Path((user_id, id)): Path<(String, i64)>,
    Json(request): Json<UpdateWatchedRequest>,
) -> Result<Json<WatchedRecord>, ApiError> {
    let record = state.watched().update(&user_id, id, request)?;
    Ok(Json(record))
}

/// Remove a watched entry and its activity.
pub async fn remove_watched(
    State(state): State<Arc<AppState>>,
    Path((user_id, id)): Path<(String, i64)>,
) -> Result<StatusCode, ApiError> {
    state.watched().remove(&user_id, id)?;
    Ok(StatusCode::NO_CONTENT)
}
