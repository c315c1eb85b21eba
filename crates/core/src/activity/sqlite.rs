use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, ToSql};

use super::{ActivityEntry, ActivityError, ActivityFilter, ActivityKind, ActivityStore, NewActivity};
use crate::db::Database;

pub(crate) fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS activity (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            watched_id INTEGER NOT NULL REFERENCES watched(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            data TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_activity_watched_id ON activity(watched_id);
        CREATE INDEX IF NOT EXISTS idx_activity_user_id ON activity(user_id);
        CREATE INDEX IF NOT EXISTS idx_activity_created_at ON activity(created_at);
        "#,
    )
}

impl ToSql for ActivityKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ActivityKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

const ACTIVITY_COLUMNS: &str = "id, watched_id, user_id, kind, data, created_at";

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<ActivityEntry> {
    let created_at_str: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(ActivityEntry {
        id: row.get(0)?,
        watched_id: row.get(1)?,
        user_id: row.get(2)?,
        kind: row.get(3)?,
        data: row.get(4)?,
        created_at,
    })
}

/// SQLite-backed activity store
pub struct SqliteActivityStore {
    db: Database,
}

impl SqliteActivityStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn build_where_clause(filter: &ActivityFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref user_id) = filter.user_id {
            conditions.push("user_id = ?");
            params.push(Box::new(user_id.clone()));
        }

        if let Some(watched_id) = filter.watched_id {
            conditions.push("watched_id = ?");
            params.push(Box::new(watched_id));
        }

        if let Some(kind) = filter.kind {
            conditions.push("kind = ?");
            params.push(Box::new(kind));
        }

        if let Some(ref from) = filter.from {
            conditions.push("created_at >= ?");
            params.push(Box::new(from.to_rfc3339()));
        }

        if let Some(ref to) = filter.to {
            conditions.push("created_at <= ?");
            params.push(Box::new(to.to_rfc3339()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }
}

impl ActivityStore for SqliteActivityStore {
    fn append(&self, entry: &NewActivity) -> Result<ActivityEntry, ActivityError> {
        let conn = self.db.lock();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO activity (watched_id, user_id, kind, data, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                entry.watched_id,
                &entry.user_id,
                entry.kind,
                &entry.data,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| ActivityError::Database(e.to_string()))?;

        Ok(ActivityEntry {
            id: conn.last_insert_rowid(),
            watched_id: entry.watched_id,
            user_id: entry.user_id.clone(),
            kind: entry.kind,
            data: entry.data.clone(),
            created_at: now,
        })
    }

    fn list_for_watched(&self, watched_id: i64) -> Result<Vec<ActivityEntry>, ActivityError> {
        let conn = self.db.lock();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM activity WHERE watched_id = ? ORDER BY id ASC",
                ACTIVITY_COLUMNS
            ))
            .map_err(|e| ActivityError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![watched_id], row_to_entry)
            .map_err(|e| ActivityError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ActivityError::Database(e.to_string()))
    }

    fn query(&self, filter: &ActivityFilter) -> Result<Vec<ActivityEntry>, ActivityError> {
        let conn = self.db.lock();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT {} FROM activity {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            ACTIVITY_COLUMNS, where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ActivityError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), row_to_entry)
            .map_err(|e| ActivityError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ActivityError::Database(e.to_string()))
    }

    fn count(&self, filter: &ActivityFilter) -> Result<i64, ActivityError> {
        let conn = self.db.lock();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!("SELECT COUNT(*) FROM activity {}", where_clause);

        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| ActivityError::Database(e.to_string()))
    }
}
