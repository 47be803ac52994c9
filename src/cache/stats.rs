//! Cache Statistics Module
//!
//! Counts where intercepted responses came from and what maintenance removed.

use serde::Serialize;

// == Served From ==
/// Provenance of a response returned by the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServedFrom {
    /// Fresh from the origin
    Network,
    /// From cache, within its partition's max age
    Cache,
    /// From cache, past max age or without a timestamp
    StaleCache,
    /// The cached offline fallback page
    OfflinePage,
    /// Synthetic 503 response
    Offline,
}

impl ServedFrom {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServedFrom::Network => "network",
            ServedFrom::Cache => "cache",
            ServedFrom::StaleCache => "stale-cache",
            ServedFrom::OfflinePage => "offline-page",
            ServedFrom::Offline => "offline",
        }
    }
}

// == Cache Stats ==
/// Tracks cache activity counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Responses served from a fresh cache entry
    pub cache_hits: u64,
    /// Responses served from a stale cache entry
    pub stale_hits: u64,
    /// Responses served from the network
    pub network_responses: u64,
    /// Offline page or synthetic 503 responses
    pub offline_responses: u64,
    /// Requests passed through without interception
    pub passthrough: u64,
    /// Failed background revalidations
    pub background_failures: u64,
    /// Cache writes rejected by the store
    pub write_failures: u64,
    /// Entries removed by expiry sweeps
    pub expired: u64,
    /// Entries removed by size-budget enforcement
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of intercepted responses answered from cache (fresh or stale).
    ///
    /// Returns 0.0 if nothing has been served yet.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.cache_hits + self.stale_hits;
        let total = hits + self.network_responses + self.offline_responses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    // == Record Served ==
    pub fn record_served(&mut self, source: ServedFrom) {
        match source {
            ServedFrom::Network => self.network_responses += 1,
            ServedFrom::Cache => self.cache_hits += 1,
            ServedFrom::StaleCache => self.stale_hits += 1,
            ServedFrom::OfflinePage | ServedFrom::Offline => self.offline_responses += 1,
        }
    }

    pub fn record_passthrough(&mut self) {
        self.passthrough += 1;
    }

    pub fn record_background_failure(&mut self) {
        self.background_failures += 1;
    }

    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }
}
