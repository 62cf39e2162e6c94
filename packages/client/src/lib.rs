//! Reader-facing operations for Advocacy Commons.
//!
//! [`CommunityClient`] combines a [`ContentStore`] (where comments, votes
//! and submissions live) with a [`SessionGuard`] (who this reader is and
//! what they are still allowed to do). Every mutating call follows the same
//! shape: validate input, consult the local limits, write to the store,
//! then update the local ledgers.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`comments`] | Post, list and flag comments |
//! | [`feedback`] | Helpful / not-helpful votes on resources |
//! | [`submission`] | Public resource and story proposals |
//! | [`http`] | [`HttpContentStore`], the store client for a document node |
//! | [`poll`] | Background refresh of a comment listing |

use std::sync::Arc;

use advocacy_commons_session::{Clock, KeyValueStore, SessionGuard, SystemClock};
use advocacy_commons_store_api::{ContentStore, Document, StoreError};

pub mod comments;
pub mod error;
pub mod feedback;
pub mod http;
pub mod poll;
pub mod submission;

pub use comments::{listing_query, FlagOutcome};
pub use error::{ActionError, Duplicate};
pub use http::HttpContentStore;
pub use poll::{CommentPoller, CommentSnapshot, PollHandle};

/// One reader's view of the site.
pub struct CommunityClient<S, C = SystemClock> {
    store: Arc<dyn ContentStore>,
    guard: SessionGuard<S, C>,
}

impl<S: KeyValueStore> CommunityClient<S> {
    pub fn new(store: Arc<dyn ContentStore>, local: S) -> Self {
        Self::with_guard(store, SessionGuard::new(local))
    }
}

impl<S: KeyValueStore, C: Clock> CommunityClient<S, C> {
    pub fn with_guard(store: Arc<dyn ContentStore>, guard: SessionGuard<S, C>) -> Self {
        Self { store, guard }
    }

    pub fn guard(&self) -> &SessionGuard<S, C> {
        &self.guard
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn session_id(&self) -> String {
        self.guard.session_id()
    }
}

/// Decode a stored document, reporting a shape mismatch as an internal error.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(doc: &Document) -> Result<T, StoreError> {
    doc.decode()
        .map_err(|e| StoreError::Internal(format!("malformed {} {}: {e}", doc.doc_type, doc.id)))
}
