//! Watched list - per-user status and rating for cached titles.

mod service;
mod sqlite;
mod types;

pub use service::WatchedService;
pub use sqlite::SqliteWatchedStore;
pub use types::*;

pub(crate) use sqlite::initialize_schema;

use chrono::{DateTime, Utc};

/// Trait for watched storage.
///
/// Lookups and mutations of existing rows take the acting user id and only
/// match that user's rows.
pub trait WatchedStore: Send + Sync {
    /// Insert a new entry. Fails with `AlreadyExists` when the user already
    /// tracks the content.
    fn insert(&self, watched: &NewWatched) -> Result<WatchedRecord, WatchedStoreError>;

    /// All entries of a user, in insertion order, with content attached.
    fn list(&self, user_id: &str) -> Result<Vec<WatchedRecord>, WatchedStoreError>;

    /// One entry of a user.
    fn get(&self, user_id: &str, id: i64) -> Result<Option<WatchedRecord>, WatchedStoreError>;

    /// Apply changes, stamping `updated_at`. Returns false when no row of
    /// this user has the id.
    fn update(
        &self,
        user_id: &str,
        id: i64,
        changes: &WatchedChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, WatchedStoreError>;

    /// Hard delete. Returns false when no row of this user has the id.
    fn remove(&self, user_id: &str, id: i64) -> Result<bool, WatchedStoreError>;
}
