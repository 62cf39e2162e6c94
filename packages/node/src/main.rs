//! `commons-node` — reference document node for Advocacy Commons.
//!
//! # Quick start
//!
//! ```sh
//! # In-memory node on the default port:
//! commons-node
//!
//! # Persistent SQLite node:
//! COMMONS_DB=./commons.db commons-node
//!
//! # Custom bind address and name:
//! COMMONS_BIND=127.0.0.1:8080 COMMONS_NAME="Commons staging" commons-node
//! ```
//!
//! # Environment variables
//!
//! See [`NodeConfig`] for the full list.

use std::process::ExitCode;
use std::sync::Arc;

use advocacy_commons_node::{build_router, NodeConfig, SqliteContentStore};
use advocacy_commons_store_api::{ContentStore, MemoryContentStore};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "advocacy_commons_node=info,tower_http=debug".into()
            }),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = NodeConfig::from_env()?;

    let store: Arc<dyn ContentStore> = match &config.db_path {
        Some(path) => {
            tracing::info!("storage: SQLite at {path}");
            Arc::new(
                SqliteContentStore::open(path)
                    .map_err(|e| format!("failed to open SQLite database at {path}: {e}"))?,
            )
        }
        None => {
            tracing::info!("storage: in-memory (data will not survive restart)");
            Arc::new(MemoryContentStore::new())
        }
    };

    let app = build_router(store, config.clone());

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("could not listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
