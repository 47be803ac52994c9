//! Response DTOs for the control surface
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::worker::WorkerState;

/// Reply to `GET_CACHE_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheSizeResponse {
    /// Declared bytes across every partition
    #[serde(rename = "totalSize")]
    pub total_size: u64,
}

impl CacheSizeResponse {
    pub fn new(total_size: u64) -> Self {
        Self { total_size }
    }
}

/// Acknowledgement for control messages without a reply
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedResponse {
    pub status: String,
    /// The message type that was handled
    #[serde(rename = "type")]
    pub message_type: String,
}

impl AcceptedResponse {
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            status: "accepted".to_string(),
            message_type: message_type.into(),
        }
    }
}

/// Response body for sync triggers
#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub tag: String,
    /// Whether the tag is one the manager acts on
    pub handled: bool,
}

impl SyncResponse {
    pub fn new(tag: impl Into<String>, handled: bool) -> Self {
        Self {
            tag: tag.into(),
            handled,
        }
    }
}

/// Response body for the stats endpoint (GET /_offline/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub state: WorkerState,
    pub version: String,
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Share of intercepted responses answered from cache
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(state: WorkerState, version: impl Into<String>, stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            state,
            version: version.into(),
            stats,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
