use std::sync::Arc;

use os_revoke_api::{AppState, Config, app_router};
use os_revoke_storage::{EventPruner, MemoryEventStore};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "os_revoke_api=debug,os_revoke_storage=info,tower_http=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env()?;
    tracing::info!(
        max_token_lifetime_secs = cfg.retention.max_token_lifetime.as_secs(),
        pruning_enabled = cfg.retention.enabled,
        fallback = ?cfg.fallback,
        "configuration loaded"
    );

    let store = Arc::new(MemoryEventStore::with_retention(cfg.retention.clone()));
    let shutdown = CancellationToken::new();
    let pruner = EventPruner::new(store.clone(), cfg.retention.clone()).spawn(shutdown.clone());

    let bind_addr = cfg.bind_addr;
    let state = Arc::new(AppState::new(cfg, store));
    let app = app_router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(shutdown.clone())).await?;

    shutdown.cancel();
    if let Err(err) = pruner.await {
        tracing::warn!(error = %err, "event pruner task panicked");
    }
    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::warn!(error = %err, "failed to listen for ctrl-c");
            }
            tracing::info!("shutdown requested");
        }
        _ = token.cancelled() => {}
    }
}
