//! Cache Storage Ports
//!
//! Store abstraction the manager is written against. A storage is a registry of
//! named partitions; each partition is a key-value map from request identity to
//! stored entry with atomic per-key operations and no cross-key transactions.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::cache::CacheEntry;
use crate::error::Result;
use crate::http::FetchRequest;

// == Request Key ==
/// Identity of a cached request: method plus absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: impl Into<String>, url: &Url) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url: url.as_str().to_string(),
        }
    }

    /// Key for a plain GET of `url`.
    pub fn get(url: &Url) -> Self {
        Self::new("GET", url)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

impl From<&FetchRequest> for RequestKey {
    fn from(request: &FetchRequest) -> Self {
        Self::new(request.method.clone(), &request.url)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

// == Partition ==
/// A single named cache region.
#[async_trait]
pub trait Partition: Send + Sync {
    /// Partition name.
    fn name(&self) -> &str;

    /// Look up an entry.
    async fn get(&self, key: &RequestKey) -> Result<Option<CacheEntry>>;

    /// Insert or replace an entry.
    async fn put(&self, key: RequestKey, entry: CacheEntry) -> Result<()>;

    /// Remove an entry. Returns whether it existed.
    async fn delete(&self, key: &RequestKey) -> Result<bool>;

    /// Snapshot of the keys currently stored.
    async fn keys(&self) -> Result<Vec<RequestKey>>;
}

// == Cache Storage ==
/// Registry of named partitions.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a partition, creating it if it does not exist.
    async fn open(&self, name: &str) -> Result<Arc<dyn Partition>>;

    /// Whether a partition with this name exists.
    async fn has(&self, name: &str) -> Result<bool>;

    /// Delete a partition wholesale. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Names of all existing partitions.
    async fn names(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_key_from_request() {
        let req = FetchRequest::get("https://docs.example.com/docs/intro?x=1").unwrap();
        let key = RequestKey::from(&req);

        assert_eq!(key.method, "GET");
        assert_eq!(key.url, "https://docs.example.com/docs/intro?x=1");
        assert!(key.is_get());
        assert_eq!(key.to_string(), "GET https://docs.example.com/docs/intro?x=1");
    }

    #[test]
    fn test_request_key_distinguishes_methods() {
        let url = Url::parse("https://docs.example.com/api/search").unwrap();
        assert_ne!(RequestKey::new("post", &url), RequestKey::get(&url));
        assert_eq!(RequestKey::new("post", &url).method, "POST");
    }
}
