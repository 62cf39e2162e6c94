//! Document model and content store contract for Advocacy Commons.
//!
//! The site keeps its content in a headless document store. This crate
//! encodes that store's interface as Rust types and one trait, so the
//! moderation and feedback logic can run against any backend: in memory,
//! SQLite on a document node, or a remote node over HTTP.
//!
//! # Endpoints covered
//!
//! | Method | Path | Type |
//! |--------|------|------|
//! | GET | `/v1/info` | → [`NodeInfo`] |
//! | POST | `/v1/query` | [`DocumentQuery`] → [`QueryResponse`] |
//! | POST | `/v1/documents` | [`NewDocument`] → [`Document`] |
//! | GET | `/v1/documents/{id}` | → [`Document`] |
//! | POST | `/v1/documents/{id}/patch` | [`Patch`] → [`Document`] |
//! | POST | `/api/submit` | [`SubmissionRequest`] → [`SubmitResponse`] |

pub mod document;
pub mod error;
pub mod memory;
pub mod node;
pub mod patch;
pub mod query;
pub mod store;
pub mod submit;

pub use document::{Document, NewDocument};
pub use error::ErrorResponse;
pub use memory::MemoryContentStore;
pub use node::NodeInfo;
pub use patch::Patch;
pub use query::{Direction, DocumentQuery, Order, Predicate, QueryResponse};
pub use store::{ContentStore, StoreError};
pub use submit::{SubmissionRequest, SubmitResponse};
