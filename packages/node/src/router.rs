//! Assembles the Axum [`Router`] from all handler modules.

use std::sync::Arc;

use advocacy_commons_store_api::ContentStore;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    config::NodeConfig,
    handlers::{documents, node, submit, AppState},
};

/// Build the complete application router with shared state.
pub fn build_router(store: Arc<dyn ContentStore>, config: NodeConfig) -> Router {
    let state = AppState { store, config };

    Router::new()
        // Node info
        .route("/v1/info", get(node::info))
        // Documents
        .route("/v1/query", post(documents::query))
        .route("/v1/documents", post(documents::create))
        .route("/v1/documents/{id}", get(documents::get_by_id))
        .route("/v1/documents/{id}/patch", post(documents::patch))
        // Public submission form
        .route("/api/submit", post(submit::submit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
