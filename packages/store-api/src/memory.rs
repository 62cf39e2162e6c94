//! In-memory content store.
//!
//! All documents are held in RAM behind a [`RwLock`] and are lost when the
//! process exits. Use this for tests and ephemeral nodes.
//!
//! Documents live in a [`BTreeMap`] keyed by UUIDv7 id, so unordered
//! queries come back in creation order without a secondary index.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::document::{Document, NewDocument};
use crate::patch::Patch;
use crate::query::DocumentQuery;
use crate::store::{ContentStore, StoreError};

/// Thread-safe, in-memory implementation of [`ContentStore`].
pub struct MemoryContentStore {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of documents held, across all types.
    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().unwrap_or_else(|p| p.into_inner());
        Ok(query.run(docs.values()))
    }

    async fn create(&self, doc: NewDocument) -> Result<Document, StoreError> {
        if doc.doc_type.is_empty() {
            return Err(StoreError::Invalid("document type must not be empty".into()));
        }
        let doc = Document::new(doc.doc_type, doc.fields);
        let mut docs = self.docs.write().unwrap_or_else(|p| p.into_inner());
        docs.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn patch(&self, id: &str, patch: &Patch) -> Result<Document, StoreError> {
        // Read, apply and write back under one write lock.
        let mut docs = self.docs.write().unwrap_or_else(|p| p.into_inner());
        let doc = docs.get_mut(id).ok_or(StoreError::NotFound)?;
        patch.apply(doc)?;
        Ok(doc.clone())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().unwrap_or_else(|p| p.into_inner());
        Ok(docs.get(id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
