//! Shared helpers for the Advocacy Commons conformance test suite.
//!
//! Provides [`spawn_node`], which binds a `TcpListener` on an ephemeral
//! port, wires up an in-process document node, and returns the local URL
//! together with the store the node writes to, so tests can seed or inspect
//! documents without going through HTTP.

use std::sync::Arc;

use advocacy_commons_node::{build_router, NodeConfig, SqliteContentStore};
use advocacy_commons_store_api::{ContentStore, MemoryContentStore};

/// Start an ephemeral in-memory node and return `(base_url, store)`.
///
/// The node runs in a background `tokio` task bound to an OS-assigned port
/// on `127.0.0.1`, e.g. `http://127.0.0.1:51234`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_node() -> (String, Arc<MemoryContentStore>) {
    let store = Arc::new(MemoryContentStore::new());
    let url = serve(Arc::clone(&store) as Arc<dyn ContentStore>, None).await;
    (url, store)
}

/// Like [`spawn_node`], but backed by a SQLite file at `db_path`.
pub async fn spawn_sqlite_node(db_path: &str) -> (String, Arc<SqliteContentStore>) {
    let store = Arc::new(SqliteContentStore::open(db_path).expect("open sqlite store"));
    let url = serve(
        Arc::clone(&store) as Arc<dyn ContentStore>,
        Some(db_path.to_string()),
    )
    .await;
    (url, store)
}

async fn serve(store: Arc<dyn ContentStore>, db_path: Option<String>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");

    let config = NodeConfig {
        name: Some("conformance-node".into()),
        bind_addr: addr,
        db_path,
    };
    let router = build_router(store, config);

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance node error");
    });

    format!("http://{addr}")
}
