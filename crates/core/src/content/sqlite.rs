//! SQLite-backed content store.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use tracing::debug;

use super::{ContentRecord, ContentStore, ContentStoreError, InsertOutcome, NewContent};
use crate::db::{is_unique_violation, Database};
use crate::external_catalog::MediaKind;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Columns selected for a [`ContentRecord`], in `row_to_content` order.
pub(crate) const CONTENT_COLUMNS: &str = "c.id, c.external_id, c.kind, c.title, c.overview, \
     c.poster_path, c.release_date, c.popularity, c.vote_average, c.vote_count, c.imdb_id, \
     c.status, c.budget, c.revenue, c.created_at";

pub(crate) fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- One row per (external id, kind), shared by all users
        CREATE TABLE IF NOT EXISTS content (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            external_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            overview TEXT NOT NULL DEFAULT '',
            poster_path TEXT NOT NULL DEFAULT '',
            release_date TEXT,
            popularity REAL NOT NULL DEFAULT 0,
            vote_average REAL NOT NULL DEFAULT 0,
            vote_count INTEGER NOT NULL DEFAULT 0,
            imdb_id TEXT,
            status TEXT NOT NULL DEFAULT '',
            budget INTEGER NOT NULL DEFAULT 0,
            revenue INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            CONSTRAINT content_external_kind UNIQUE (external_id, kind)
        );
        "#,
    )
}

impl ToSql for MediaKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MediaKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Convert a row to a ContentRecord, reading columns starting at `offset`.
pub(crate) fn row_to_content(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<ContentRecord> {
    let release_date: Option<String> = row.get(offset + 6)?;
    let created_at_str: String = row.get(offset + 14)?;

    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(ContentRecord {
        id: row.get(offset)?,
        external_id: row.get(offset + 1)?,
        kind: row.get(offset + 2)?,
        title: row.get(offset + 3)?,
        overview: row.get(offset + 4)?,
        poster_path: row.get(offset + 5)?,
        release_date: release_date.and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
        popularity: row.get::<_, f64>(offset + 7)? as f32,
        vote_average: row.get::<_, f64>(offset + 8)? as f32,
        vote_count: row.get(offset + 9)?,
        imdb_id: row.get(offset + 10)?,
        status: row.get(offset + 11)?,
        budget: row.get::<_, i64>(offset + 12)?.max(0) as u64,
        revenue: row.get::<_, i64>(offset + 13)?.max(0) as u64,
        created_at,
    })
}

fn find_in(
    conn: &Connection,
    external_id: u32,
    kind: MediaKind,
) -> rusqlite::Result<Option<ContentRecord>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM content c WHERE c.external_id = ? AND c.kind = ?",
            CONTENT_COLUMNS
        ),
        params![external_id, kind],
        |row| row_to_content(row, 0),
    )
    .optional()
}

/// SQLite-backed content store.
pub struct SqliteContentStore {
    db: Database,
}

impl SqliteContentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl ContentStore for SqliteContentStore {
    fn find(
        &self,
        external_id: u32,
        kind: MediaKind,
    ) -> Result<Option<ContentRecord>, ContentStoreError> {
        let conn = self.db.lock();
        find_in(&conn, external_id, kind).map_err(|e| ContentStoreError::Database(e.to_string()))
    }

    fn get(&self, id: i64) -> Result<ContentRecord, ContentStoreError> {
        let conn = self.db.lock();
        conn.query_row(
            &format!("SELECT {} FROM content c WHERE c.id = ?", CONTENT_COLUMNS),
            params![id],
            |row| row_to_content(row, 0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                ContentStoreError::NotFound(format!("content {}", id))
            }
            _ => ContentStoreError::Database(e.to_string()),
        })
    }

    fn insert_or_get(&self, content: &NewContent) -> Result<InsertOutcome, ContentStoreError> {
        let conn = self.db.lock();
        let now = Utc::now();

        let inserted = conn.execute(
            "INSERT INTO content (external_id, kind, title, overview, poster_path, release_date,
                popularity, vote_average, vote_count, imdb_id, status, budget, revenue, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                content.external_id,
                content.kind,
                &content.title,
                &content.overview,
                &content.poster_path,
                content.release_date.map(|d| d.format(DATE_FORMAT).to_string()),
                content.popularity as f64,
                content.vote_average as f64,
                content.vote_count,
                &content.imdb_id,
                &content.status,
                content.budget as i64,
                content.revenue as i64,
                now.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                Ok(InsertOutcome::Inserted(content.clone().into_record(id, now)))
            }
            Err(e) if is_unique_violation(&e) => {
                debug!(
                    "Content {} {} inserted concurrently, reading canonical row",
                    content.kind, content.external_id
                );
                let existing = find_in(&conn, content.external_id, content.kind)
                    .map_err(|e| ContentStoreError::Database(e.to_string()))?
                    .ok_or_else(|| {
                        ContentStoreError::Database(format!(
                            "content {} {} rejected as duplicate but not found",
                            content.kind, content.external_id
                        ))
                    })?;
                Ok(InsertOutcome::Existing(existing))
            }
            Err(e) => Err(ContentStoreError::Database(e.to_string())),
        }
    }

    fn count(&self) -> Result<u64, ContentStoreError> {
        let conn = self.db.lock();
        conn.query_row("SELECT COUNT(*) FROM content", [], |row| row.get(0))
            .map_err(|e| ContentStoreError::Database(e.to_string()))
    }
}
