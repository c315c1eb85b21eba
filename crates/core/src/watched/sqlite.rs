//! SQLite-backed watched store.
//!
//! Every statement that reads or changes an existing row is filtered by
//! `user_id`, so a caller can never see or touch another user's entries.

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, ToSql};

use super::{NewWatched, WatchedChanges, WatchedRecord, WatchedStatus, WatchedStore, WatchedStoreError};
use crate::content::{row_to_content, CONTENT_COLUMNS};
use crate::db::{is_unique_violation, Database};

/// Number of `w.*` columns selected before the content columns.
const WATCHED_COLUMN_COUNT: usize = 6;

pub(crate) fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS watched (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            content_id INTEGER NOT NULL REFERENCES content(id),
            status TEXT NOT NULL,
            rating INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CONSTRAINT watched_user_content UNIQUE (user_id, content_id)
        );

        CREATE INDEX IF NOT EXISTS idx_watched_user_id ON watched(user_id);
        "#,
    )
}

impl ToSql for WatchedStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WatchedStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

fn select_sql(condition: &str) -> String {
    format!(
        "SELECT w.id, w.user_id, w.status, w.rating, w.created_at, w.updated_at, {}
         FROM watched w JOIN content c ON c.id = w.content_id
         WHERE {}
         ORDER BY w.id ASC",
        CONTENT_COLUMNS, condition
    )
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Convert a joined row to a WatchedRecord. Activity is loaded separately.
fn row_to_watched(row: &rusqlite::Row) -> rusqlite::Result<WatchedRecord> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(WatchedRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        status: row.get(2)?,
        rating: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
        updated_at: parse_timestamp(5, &updated_at)?,
        content: row_to_content(row, WATCHED_COLUMN_COUNT)?,
        activity: Vec::new(),
    })
}

fn get_in(conn: &Connection, user_id: &str, id: i64) -> rusqlite::Result<Option<WatchedRecord>> {
    conn.query_row(
        &select_sql("w.id = ? AND w.user_id = ?"),
        params![id, user_id],
        row_to_watched,
    )
    .optional()
}

/// SQLite-backed watched store.
pub struct SqliteWatchedStore {
    db: Database,
}

impl SqliteWatchedStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl WatchedStore for SqliteWatchedStore {
    fn insert(&self, watched: &NewWatched) -> Result<WatchedRecord, WatchedStoreError> {
        let conn = self.db.lock();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO watched (user_id, content_id, status, rating, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                &watched.user_id,
                watched.content_id,
                watched.status,
                watched.rating,
                &now,
                &now,
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                WatchedStoreError::AlreadyExists
            } else {
                WatchedStoreError::Database(e.to_string())
            }
        })?;

        let id = conn.last_insert_rowid();
        get_in(&conn, &watched.user_id, id)
            .map_err(|e| WatchedStoreError::Database(e.to_string()))?
            .ok_or_else(|| WatchedStoreError::Database(format!("watched {} vanished after insert", id)))
    }

    fn list(&self, user_id: &str) -> Result<Vec<WatchedRecord>, WatchedStoreError> {
        let conn = self.db.lock();

        let mut stmt = conn
            .prepare(&select_sql("w.user_id = ?"))
            .map_err(|e| WatchedStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], row_to_watched)
            .map_err(|e| WatchedStoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| WatchedStoreError::Database(e.to_string()))
    }

    fn get(&self, user_id: &str, id: i64) -> Result<Option<WatchedRecord>, WatchedStoreError> {
        let conn = self.db.lock();
        get_in(&conn, user_id, id).map_err(|e| WatchedStoreError::Database(e.to_string()))
    }

    fn update(
        &self,
        user_id: &str,
        id: i64,
        changes: &WatchedChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, WatchedStoreError> {
        let mut assignments = vec!["updated_at = ?"];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(updated_at.to_rfc3339())];

        if let Some(status) = changes.status {
            assignments.push("status = ?");
            values.push(Box::new(status));
        }
        if let Some(rating) = changes.rating {
            assignments.push("rating = ?");
            values.push(Box::new(rating));
        }

        values.push(Box::new(id));
        values.push(Box::new(user_id.to_string()));

        let sql = format!(
            "UPDATE watched SET {} WHERE id = ? AND user_id = ?",
            assignments.join(", ")
        );
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let conn = self.db.lock();
        let rows = conn
            .execute(&sql, param_refs.as_slice())
            .map_err(|e| WatchedStoreError::Database(e.to_string()))?;

        Ok(rows > 0)
    }

    fn remove(&self, user_id: &str, id: i64) -> Result<bool, WatchedStoreError> {
        let conn = self.db.lock();
        let rows = conn
            .execute(
                "DELETE FROM watched WHERE id = ? AND user_id = ?",
                params![id, user_id],
            )
            .map_err(|e| WatchedStoreError::Database(e.to_string()))?;

        Ok(rows > 0)
    }
}
