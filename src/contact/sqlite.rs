//! SQLite-backed document store
//!
//! Documents are JSON bodies stored per collection in a single `documents`
//! table. Each `connect` opens its own SQLite connection, so concurrent
//! submissions are serialized by SQLite rather than by the caller.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use uuid::Uuid;

use super::store::{DocumentBackend, DocumentConnection};
use crate::error::StoreError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id          TEXT PRIMARY KEY,
    collection  TEXT NOT NULL,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS documents_collection ON documents (collection, created_at);
";

/// Opens connections to a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    path: PathBuf,
}

impl SqliteBackend {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentBackend for SqliteBackend {
    type Connection = SqliteConnection;

    fn connect(&self) -> Result<SqliteConnection, StoreError> {
        let started_at = Instant::now();

        let conn = Connection::open(&self.path)
            .and_then(|conn| {
                conn.busy_timeout(Duration::from_secs(5))?;
                conn.execute_batch(SCHEMA)?;
                Ok(conn)
            })
            .map_err(|e| StoreError::Unreachable(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!(
            path = %self.path.display(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "Opened document store"
        );
        Ok(SqliteConnection { conn })
    }
}

/// One open SQLite connection
pub struct SqliteConnection {
    conn: Connection,
}

impl DocumentConnection for SqliteConnection {
    fn insert_one(&mut self, collection: &str, document: &Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let body = serde_json::to_string(document).map_err(|e| StoreError::Write(e.to_string()))?;
        let created_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO documents (id, collection, body, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, collection, body, created_at],
            )
            .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(id)
    }

    fn find_one(&mut self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Read(e.to_string()))?;

        body.map(|body| parse_body(id, &body)).transpose()
    }

    fn find_all(&mut self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, body FROM documents WHERE collection = ?1 ORDER BY created_at, rowid",
            )
            .map_err(|e| StoreError::Read(e.to_string()))?;

        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| StoreError::Read(e.to_string()))?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, body) = row.map_err(|e| StoreError::Read(e.to_string()))?;
            let document = parse_body(&id, &body)?;
            documents.push((id, document));
        }
        Ok(documents)
    }

    fn close(self) {
        if let Err((_, e)) = self.conn.close() {
            tracing::warn!("Failed to close document store connection: {}", e);
        }
    }
}

fn parse_body(id: &str, body: &str) -> Result<Value, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Read(format!("corrupt document {}: {}", id, e)))
}
