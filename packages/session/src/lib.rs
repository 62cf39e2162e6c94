//! Client-side anti-abuse state for Advocacy Commons.
//!
//! Readers are anonymous. This crate gives each client a stable session id
//! and enforces two soft limits in client-local storage:
//!
//! - at most 3 comments per rolling minute,
//! - at most 10 flags per rolling day, and never the same comment twice.
//!
//! There is no I/O of its own: storage arrives through [`KeyValueStore`]
//! and time through [`Clock`], so the same code runs in the CLI (JSON file)
//! and the browser (`localStorage`).
//!
//! # Quick start
//!
//! ```rust
//! use advocacy_commons_session::{MemoryKeyValueStore, SessionGuard};
//!
//! let guard = SessionGuard::new(MemoryKeyValueStore::new());
//! if guard.can_submit_comment().is_allowed() {
//!     // ... write the comment ...
//!     guard.record_comment_submission();
//! }
//! assert!(guard.session_id().starts_with("session_"));
//! ```

pub mod clock;
pub mod guard;
pub mod identity;
pub mod kv;
pub mod ledger;
pub mod rate_limit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use guard::SessionGuard;
pub use identity::{generate_session_id, SESSION_KEY};
pub use kv::{FileKeyValueStore, KeyValueStore, KvError, MemoryKeyValueStore};
pub use rate_limit::{RateDecision, RatePolicy, COMMENT_POLICY, FLAG_POLICY};
