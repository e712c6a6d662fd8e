//! Binary entrypoint for the listman HTTP server.
//!
//! Reads configuration from `LISTMAN_*` environment variables (see
//! [`ServerConfig`]) and log filtering from `RUST_LOG`.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use listman_server::config::ServerConfig;
use listman_server::index::{spawn_index_logger, ChannelIndexNotifier};
use listman_server::router::build_router;
use listman_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("listman_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    if config.forgery_token.is_none() {
        tracing::warn!("LISTMAN_FORGERY_TOKEN is not set; all mutating requests will be rejected");
    }

    let (notifier, events) = ChannelIndexNotifier::new();
    spawn_index_logger(events);

    let state = AppState::open(&config, Arc::new(notifier))?;
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(db_path = %config.db_path, "listman server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
            }
        })
        .await?;
    Ok(())
}
