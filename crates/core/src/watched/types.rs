//! Types for the watched list.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::ActivityEntry;
use crate::content::{ContentRecord, ResolveError};
use crate::external_catalog::MediaKind;

/// Highest accepted rating. Zero means unrated.
pub const MAX_RATING: u8 = 10;

/// Where a user is with a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WatchedStatus {
    #[default]
    Watching,
    Finished,
    Planned,
    OnHold,
    Dropped,
}

impl WatchedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchedStatus::Watching => "WATCHING",
            WatchedStatus::Finished => "FINISHED",
            WatchedStatus::Planned => "PLANNED",
            WatchedStatus::OnHold => "ONHOLD",
            WatchedStatus::Dropped => "DROPPED",
        }
    }
}

impl fmt::Display for WatchedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WATCHING" => Ok(WatchedStatus::Watching),
            "FINISHED" => Ok(WatchedStatus::Finished),
            "PLANNED" => Ok(WatchedStatus::Planned),
            "ONHOLD" => Ok(WatchedStatus::OnHold),
            "DROPPED" => Ok(WatchedStatus::Dropped),
            other => Err(format!("unknown watched status: {}", other)),
        }
    }
}

/// One user's relationship to one title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedRecord {
    pub id: i64,
    pub user_id: String,
    pub content: ContentRecord,
    pub status: WatchedStatus,
    /// 0 = unrated, otherwise 1..=10.
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Activity entries, oldest first.
    #[serde(default)]
    pub activity: Vec<ActivityEntry>,
}

/// A watched row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWatched {
    pub user_id: String,
    pub content_id: i64,
    pub status: WatchedStatus,
    pub rating: u8,
}

/// Fields an update actually changes. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchedChanges {
    pub status: Option<WatchedStatus>,
    pub rating: Option<u8>,
}

impl WatchedChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.rating.is_none()
    }
}

/// Request to add a title to a user's watched list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddWatchedRequest {
    pub external_id: u32,
    pub kind: MediaKind,
    #[serde(default)]
    pub status: Option<WatchedStatus>,
    #[serde(default)]
    pub rating: Option<u8>,
}

/// Request to change status and/or rating of a watched entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWatchedRequest {
    #[serde(default)]
    pub status: Option<WatchedStatus>,
    /// Zero means "not supplied".
    #[serde(default)]
    pub rating: Option<u8>,
}

impl UpdateWatchedRequest {
    /// Normalize into the set of columns to change.
    pub fn into_changes(self) -> Result<WatchedChanges, WatchedError> {
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }

        let changes = WatchedChanges {
            status: self.status,
            rating: self.rating.filter(|r| *r != 0),
        };
        if changes.is_empty() {
            return Err(WatchedError::Invalid(
                "update must change status or rating".to_string(),
            ));
        }

        Ok(changes)
    }
}

pub(crate) fn check_rating(rating: u8) -> Result<(), WatchedError> {
    if rating > MAX_RATING {
        return Err(WatchedError::Invalid(format!(
            "rating must be between 0 and {}",
            MAX_RATING
        )));
    }
    Ok(())
}

/// Errors for watched storage operations.
#[derive(Debug, Error)]
pub enum WatchedStoreError {
    /// The (user, content) pair is already present.
    #[error("Watched entry already exists")]
    AlreadyExists,

    #[error("Database error: {0}")]
    Database(String),
}

/// Errors returned by [`WatchedService`](super::WatchedService).
///
/// Messages are safe to show to users; storage and catalog detail is only
/// reachable through `source()`.
#[derive(Debug, Error)]
pub enum WatchedError {
    #[error("watched entry not found")]
    NotFound,

    #[error("already on watched list")]
    AlreadyExists,

    #[error("content unavailable")]
    ContentUnavailable(#[source] ResolveError),

    #[error("failed to save watched entry")]
    Persist(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid request: {0}")]
    Invalid(String),
}

impl WatchedError {
    pub(crate) fn persist(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        WatchedError::Persist(Box::new(e))
    }

    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            WatchedError::NotFound => "not_found",
            WatchedError::AlreadyExists => "already_exists",
            WatchedError::ContentUnavailable(_) => "content_unavailable",
            WatchedError::Persist(_) => "persist",
            WatchedError::Invalid(_) => "invalid",
        }
    }
}

impl From<WatchedStoreError> for WatchedError {
    fn from(e: WatchedStoreError) -> Self {
        match e {
            WatchedStoreError::AlreadyExists => WatchedError::AlreadyExists,
            other => WatchedError::persist(other),
        }
    }
}
