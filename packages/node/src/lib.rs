//! Public surface for the `advocacy-commons-node` crate.
//!
//! Exposes the router builder, config and storage types so that external
//! crates (e.g. the conformance test suite) can spin up an in-process node
//! without spawning a subprocess.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod storage;

pub use config::{ConfigError, NodeConfig};
pub use router::build_router;
pub use storage::SqliteContentStore;
