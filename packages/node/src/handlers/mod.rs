//! HTTP request handlers for the document node.
//!
//! Each submodule covers a logical group of endpoints. Handlers are plain
//! async functions that receive Axum extractors and return
//! `Result<impl IntoResponse, AppError>`.

pub mod documents;
pub mod node;
pub mod submit;

use std::sync::Arc;

use advocacy_commons_store_api::ContentStore;

use crate::config::NodeConfig;

/// Shared application state threaded through all Axum handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub config: NodeConfig,
}
