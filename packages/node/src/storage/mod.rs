//! Durable content store backends for the node.
//!
//! The in-memory backend lives in `advocacy-commons-store-api` so clients
//! and tests can use it without pulling in the node.

pub mod sqlite;

pub use sqlite::SqliteContentStore;
