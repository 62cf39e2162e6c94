//! The content store contract.
//!
//! Everything substantive on the site (resources, stories, comments,
//! feedback, submissions) lives in a document store reached through
//! [`ContentStore`]. The trait is deliberately small: query, create, patch
//! and fetch-by-id. Moderation and feedback rules live in the callers.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryContentStore`](crate::memory::MemoryContentStore) | Tests, ephemeral nodes |
//! | `SqliteContentStore` (node crate) | Durable single-file node |
//! | `HttpContentStore` (client crate) | Talking to a remote node |

use async_trait::async_trait;

use crate::document::{Document, NewDocument};
use crate::patch::Patch;
use crate::query::DocumentQuery;

/// Errors that content store operations can return.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested document does not exist.
    #[error("not found")]
    NotFound,

    /// A guarded write lost a race (`if_revision` mismatch).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request was malformed (bad patch, protected field, ...).
    #[error("invalid request: {0}")]
    Invalid(String),

    /// The store could not be reached or replied with garbage.
    #[error("network error: {0}")]
    Network(String),

    /// An unexpected error in the underlying storage backend.
    #[error("internal storage error: {0}")]
    Internal(String),
}

/// The persistence contract every content store backend implements.
///
/// All methods are `async` and must be safe to call concurrently.
/// Implementations are held as `Arc<dyn ContentStore>`.
#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    /// Return the documents matching `query`, ordered and projected as asked.
    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError>;

    /// Store a new document and return it with its assigned `_id`.
    async fn create(&self, doc: NewDocument) -> Result<Document, StoreError>;

    /// Apply `patch` to document `id` as one atomic update and return the
    /// result. [`StoreError::NotFound`] if `id` does not exist.
    async fn patch(&self, id: &str, patch: &Patch) -> Result<Document, StoreError>;

    /// Retrieve a document by id. `None` if not found.
    async fn get_document(&self, id: &str) -> Result<Option<Document>, StoreError>;
}
