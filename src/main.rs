//! Offline Cache - caching proxy server
//!
//! Installs and activates the cache manager against the configured origin,
//! then serves the proxy and control surface.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use offline_cache::{create_router, spawn_maintenance_task, AppState, Config};

/// Main entry point for the offline cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache manager and install it (priming essential URLs and assets)
/// 4. Activate, deleting partitions from older versions
/// 5. Start the periodic maintenance task
/// 6. Serve until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offline_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Offline Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: origin={}, version={}, port={}, maintenance_interval={}s",
        config.origin_url, config.cache_version, config.server_port, config.maintenance_interval
    );

    let state = AppState::from_config(&config).context("Failed to create cache manager")?;

    // A failed install leaves the manager redundant; requests are passed through
    match state.cache.install().await {
        Ok(()) => {
            if let Err(e) = state.cache.skip_waiting().await {
                error!(error = %e, "Activation failed");
            }
        }
        Err(e) => error!(error = %e, "Install failed, serving without cache"),
    }

    let maintenance_handle =
        spawn_maintenance_task(Arc::clone(&state.cache), config.maintenance_interval);
    info!("Background maintenance task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(maintenance_handle))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops maintenance.
async fn shutdown_signal(maintenance_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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

    maintenance_handle.abort();
    warn!("Maintenance task aborted");
}
