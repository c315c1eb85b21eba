//! Activity log - append-only facts about watched list transitions.
//!
//! Entries are derived from successful watched mutations and are never
//! edited. They disappear only when their watched record is deleted.

mod events;
mod sqlite;
mod store;

pub use events::*;
pub use sqlite::SqliteActivityStore;
pub use store::*;

pub(crate) use sqlite::initialize_schema;
