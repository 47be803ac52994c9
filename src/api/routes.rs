//! API Routes
//!
//! Configures the Axum router: the control surface under `/_offline` plus a
//! fallback that proxies everything else through the cache.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, message_handler, periodic_sync_handler, proxy_handler, stats_handler,
    sync_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /_offline/message` - Control message from the host page
/// - `POST /_offline/sync/:tag` - Background sync trigger
/// - `POST /_offline/periodic-sync/:tag` - Periodic sync trigger
/// - `GET /_offline/stats` - Cache statistics
/// - `GET /health` - Health check endpoint
/// - anything else - proxied through the cache to the origin
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/_offline/message", post(message_handler))
        .route("/_offline/sync/:tag", post(sync_handler))
        .route("/_offline/periodic-sync/:tag", post(periodic_sync_handler))
        .route("/_offline/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .fallback(proxy_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
