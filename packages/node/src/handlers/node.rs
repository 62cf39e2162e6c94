//! Node info handler — `GET /v1/info`.

use advocacy_commons_store_api::NodeInfo;
use axum::{extract::State, Json};

use super::AppState;

/// `GET /v1/info`
pub async fn info(State(state): State<AppState>) -> Json<NodeInfo> {
    let mut info = NodeInfo::new(env!("CARGO_PKG_VERSION"), state.config.backend());
    info.name = state.config.name.clone();
    Json(info)
}
