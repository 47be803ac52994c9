//! Offline Cache - a caching proxy that keeps a documentation site usable offline
//!
//! Classifies requests into partitions, serves them with cache-first,
//! network-first or stale-while-revalidate strategies, and keeps the cache
//! bounded by age and size.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod network;
pub mod strategy;
pub mod tasks;
pub mod worker;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_maintenance_task;
pub use worker::{FetchOutcome, OfflineCache, WorkerState};
