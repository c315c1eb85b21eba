use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::watched::WatchedChanges;

/// What happened to a watched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    AddedWatched,
    StatusChanged,
    RatingChanged,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::AddedWatched => "ADDED_WATCHED",
            ActivityKind::StatusChanged => "STATUS_CHANGED",
            ActivityKind::RatingChanged => "RATING_CHANGED",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADDED_WATCHED" => Ok(ActivityKind::AddedWatched),
            "STATUS_CHANGED" => Ok(ActivityKind::StatusChanged),
            "RATING_CHANGED" => Ok(ActivityKind::RatingChanged),
            other => Err(format!("unknown activity kind: {}", other)),
        }
    }
}

/// A stored activity entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub id: i64,
    pub watched_id: i64,
    pub user_id: String,
    pub kind: ActivityKind,
    /// New value for change events (rating or status text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An activity entry about to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub watched_id: i64,
    pub user_id: String,
    pub kind: ActivityKind,
    pub data: Option<String>,
}

impl NewActivity {
    /// The fact recorded when a title is added to a watched list.
    pub fn added(user_id: impl Into<String>, watched_id: i64) -> Self {
        Self {
            watched_id,
            user_id: user_id.into(),
            kind: ActivityKind::AddedWatched,
            data: None,
        }
    }

    pub fn status_changed(
        user_id: impl Into<String>,
        watched_id: i64,
        status: impl fmt::Display,
    ) -> Self {
        Self {
            watched_id,
            user_id: user_id.into(),
            kind: ActivityKind::StatusChanged,
            data: Some(status.to_string()),
        }
    }

    pub fn rating_changed(user_id: impl Into<String>, watched_id: i64, rating: u8) -> Self {
        Self {
            watched_id,
            user_id: user_id.into(),
            kind: ActivityKind::RatingChanged,
            data: Some(rating.to_string()),
        }
    }
}

/// Entries produced by a successful update, rating first.
pub fn derive_update_activity(
    user_id: &str,
    watched_id: i64,
    changes: &WatchedChanges,
) -> Vec<NewActivity> {
    let mut entries = Vec::with_capacity(2);

    if let Some(rating) = changes.rating {
        entries.push(NewActivity::rating_changed(user_id, watched_id, rating));
    }
    if let Some(status) = changes.status {
        entries.push(NewActivity::status_changed(user_id, watched_id, status));
    }

    entries
}
