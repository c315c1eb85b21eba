//! Content cache - titles from the external catalog, persisted on first use.
//!
//! A title is fetched from the catalog the first time any user references
//! it and is shared by everyone afterwards. Concurrent first references are
//! deduplicated by the `(external_id, kind)` uniqueness constraint of the
//! store, not by an application lock.

mod cache;
mod sqlite;
mod types;

pub use cache::ContentCache;
pub use sqlite::SqliteContentStore;
pub use types::*;

pub(crate) use sqlite::{initialize_schema, row_to_content, CONTENT_COLUMNS};

use crate::external_catalog::MediaKind;

/// Trait for content storage.
pub trait ContentStore: Send + Sync {
    /// Look up a cached title by its catalog id and kind.
    fn find(
        &self,
        external_id: u32,
        kind: MediaKind,
    ) -> Result<Option<ContentRecord>, ContentStoreError>;

    /// Get a cached title by local id.
    fn get(&self, id: i64) -> Result<ContentRecord, ContentStoreError>;

    /// Insert a title, or return the row that already holds its
    /// `(external_id, kind)` if another caller inserted it first.
    fn insert_or_get(&self, content: &NewContent) -> Result<InsertOutcome, ContentStoreError>;

    /// Number of cached titles.
    fn count(&self) -> Result<u64, ContentStoreError>;
}
