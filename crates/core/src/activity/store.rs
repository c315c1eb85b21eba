use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{ActivityEntry, ActivityKind, NewActivity};

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Database error: {0}")]
    Database(String),
}

/// Filter for querying activity entries
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub user_id: Option<String>,
    pub watched_id: Option<i64>,
    pub kind: Option<ActivityKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

impl ActivityFilter {
    pub fn new() -> Self {
        Self {
            limit: 100,
            offset: 0,
            ..Default::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_watched_id(mut self, watched_id: i64) -> Self {
        self.watched_id = Some(watched_id);
        self
    }

    pub fn with_kind(mut self, kind: ActivityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_time_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for activity storage. Append-only: there is no update or delete.
pub trait ActivityStore: Send + Sync {
    /// Append an entry, returns the stored entry
    fn append(&self, entry: &NewActivity) -> Result<ActivityEntry, ActivityError>;

    /// All entries of one watched record, oldest first
    fn list_for_watched(&self, watched_id: i64) -> Result<Vec<ActivityEntry>, ActivityError>;

    /// Query entries with optional filters, newest first
    fn query(&self, filter: &ActivityFilter) -> Result<Vec<ActivityEntry>, ActivityError>;

    /// Count matching entries
    fn count(&self, filter: &ActivityFilter) -> Result<i64, ActivityError>;
}
