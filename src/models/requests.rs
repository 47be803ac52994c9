//! Request DTOs for the control surface
//!
//! Defines the messages the host page sends to the cache manager.

use serde::{Deserialize, Serialize};

/// Maximum number of URLs accepted by a single `CACHE_URLS` message
pub const MAX_CACHE_URLS: usize = 256;

/// Control message body (POST /_offline/message)
///
/// Tagged by a `type` field, e.g. `{"type": "CACHE_URLS", "urls": ["/docs/a"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate a waiting worker immediately
    SkipWaiting,
    /// Add URLs to the dynamic partition
    CacheUrls {
        #[serde(default)]
        urls: Vec<String>,
    },
    /// Delete every partition
    ClearCache,
    /// Report total declared bytes across all partitions
    GetCacheSize,
}

impl ControlMessage {
    /// Validates the message
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let ControlMessage::CacheUrls { urls } = self {
            if urls.len() > MAX_CACHE_URLS {
                return Some(format!(
                    "CACHE_URLS accepts at most {} URLs, got {}",
                    MAX_CACHE_URLS,
                    urls.len()
                ));
            }
            if urls.iter().any(|u| u.trim().is_empty()) {
                return Some("CACHE_URLS entries cannot be empty".to_string());
            }
        }
        None
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ControlMessage::SkipWaiting => "SKIP_WAITING",
            ControlMessage::CacheUrls { .. } => "CACHE_URLS",
            ControlMessage::ClearCache => "CLEAR_CACHE",
            ControlMessage::GetCacheSize => "GET_CACHE_SIZE",
        }
    }
}
