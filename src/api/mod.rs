//! API Module
//!
//! HTTP surface of the offline cache: a caching reverse proxy plus control endpoints.
//!
//! # Endpoints
//! - `POST /_offline/message` - Control message (`SKIP_WAITING`, `CACHE_URLS`, `CLEAR_CACHE`, `GET_CACHE_SIZE`)
//! - `POST /_offline/sync/:tag` - Background sync trigger
//! - `POST /_offline/periodic-sync/:tag` - Periodic sync trigger
//! - `GET /_offline/stats` - Cache statistics
//! - `GET /health` - Health check endpoint
//! - anything else - proxied through the cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
