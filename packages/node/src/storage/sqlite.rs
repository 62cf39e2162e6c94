//! SQLite-backed content store.
//!
//! Uses `rusqlite` (with bundled SQLite) wrapped in an `Arc<Mutex<Connection>>`
//! to satisfy the `Send + Sync` requirements. All blocking calls are offloaded
//! to a thread-pool via `tokio::task::spawn_blocking`.
//!
//! # Schema
//!
//! - `documents` — full JSON blob plus indexed `doc_type` and `created_at`
//!   columns. Predicates, ordering and projection are evaluated in Rust by
//!   [`DocumentQuery::run`] over the rows of the queried type, so results
//!   match the in-memory backend exactly.

use std::sync::{Arc, Mutex};

use advocacy_commons_store_api::{ContentStore, Document, DocumentQuery, NewDocument, Patch, StoreError};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id          TEXT PRIMARY KEY,
    doc_type    TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    data        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_documents_type ON documents(doc_type, created_at);
";

// ---------------------------------------------------------------------------
// SqliteContentStore
// ---------------------------------------------------------------------------

/// SQLite-backed implementation of [`ContentStore`].
///
/// Holds a single database connection protected by a `Mutex`. A patch reads,
/// applies and writes back inside one transaction while holding the lock.
pub struct SqliteContentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteContentStore {
    /// Open (or create) the SQLite database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database (data is lost when dropped).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap_or_else(|p| p.into_inner());
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// Error conversions
// ---------------------------------------------------------------------------

fn map_err(e: rusqlite::Error) -> StoreError {
    StoreError::Internal(e.to_string())
}

fn map_json_err(e: serde_json::Error) -> StoreError {
    StoreError::Internal(format!("JSON error: {e}"))
}

fn load(conn: &Connection, id: &str) -> Result<Option<Document>, StoreError> {
    let data: Option<String> = conn
        .query_row("SELECT data FROM documents WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()
        .map_err(map_err)?;
    data.map(|d| serde_json::from_str(&d).map_err(map_json_err))
        .transpose()
}

// ---------------------------------------------------------------------------
// ContentStore impl
// ---------------------------------------------------------------------------

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        let query = query.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare("SELECT data FROM documents WHERE doc_type = ?1 ORDER BY id ASC")
                .map_err(map_err)?;
            let docs = stmt
                .query_map(params![query.doc_type], |row| row.get::<_, String>(0))
                .map_err(map_err)?
                .map(|row| {
                    let data = row.map_err(map_err)?;
                    serde_json::from_str::<Document>(&data).map_err(map_json_err)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(query.run(&docs))
        })
        .await
    }

    async fn create(&self, doc: NewDocument) -> Result<Document, StoreError> {
        if doc.doc_type.is_empty() {
            return Err(StoreError::Invalid("document type must not be empty".into()));
        }
        let doc = Document::new(doc.doc_type, doc.fields);
        self.with_conn(move |conn| {
            let data = serde_json::to_string(&doc).map_err(map_json_err)?;
            conn.execute(
                "INSERT INTO documents (id, doc_type, created_at, data) VALUES (?1, ?2, ?3, ?4)",
                params![doc.id, doc.doc_type, doc.created_at.to_rfc3339(), data],
            )
            .map_err(map_err)?;
            Ok(doc)
        })
        .await
    }

    async fn patch(&self, id: &str, patch: &Patch) -> Result<Document, StoreError> {
        let id = id.to_string();
        let patch = patch.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(map_err)?;
            let mut doc = load(&tx, &id)?.ok_or(StoreError::NotFound)?;
            patch.apply(&mut doc)?;
            let data = serde_json::to_string(&doc).map_err(map_json_err)?;
            tx.execute(
                "UPDATE documents SET data = ?1 WHERE id = ?2",
                params![data, id],
            )
            .map_err(map_err)?;
            tx.commit().map_err(map_err)?;
            Ok(doc)
        })
        .await
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| load(conn, &id)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
