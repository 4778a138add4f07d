//! Uniform Cache server
//!
//! Serves one [`Cache`](uniform_cache::Cache) over HTTP. The backend is chosen
//! at startup from the configured adapter registry.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uniform_cache::api::{create_router, AppState};
use uniform_cache::{spawn_flush_task, Config};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration and adapter registry from environment variables
/// 3. Select the adapter and build the cache
/// 4. Start background flush task
/// 5. Serve until SIGINT/SIGTERM, then flush once more
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uniform_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Uniform Cache server");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: adapters=[{}], port={}, flush_interval={}s",
        config.registry.ids().join(", "),
        config.server_port,
        config.flush_interval
    );

    let state = AppState::from_config(&config).context("failed to initialize cache")?;
    info!(
        "Cache ready on adapter '{}'",
        state.cache.read().await.adapter_name()
    );

    let flush_handle = spawn_flush_task(state.cache.clone(), config.flush_interval);

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(flush_handle))
        .await
        .context("server error")?;

    if let Err(err) = state.cache.write().await.flush() {
        error!("Final flush failed: {}", err);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the flush task.
async fn shutdown_signal(flush_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    flush_handle.abort();
    warn!("Flush task aborted");
}
