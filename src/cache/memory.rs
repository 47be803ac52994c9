//! In-Memory Cache Storage
//!
//! HashMap-backed implementation of the storage ports. Each operation takes the
//! lock for a single map access only, so readers and writers interleave freely
//! between suspension points.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::storage::{CacheStorage, Partition, RequestKey};
use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

// == Memory Partition ==
/// A single partition held in memory.
#[derive(Debug)]
pub struct MemoryPartition {
    name: String,
    /// Key-value storage
    entries: RwLock<HashMap<RequestKey, CacheEntry>>,
    /// Maximum total body bytes, None = unbounded
    quota: Option<u64>,
}

impl MemoryPartition {
    // == Constructor ==
    pub fn new(name: impl Into<String>, quota: Option<u64>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
            quota,
        }
    }

    // == Length ==
    /// Returns the current number of entries in the partition.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Partition for MemoryPartition {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &RequestKey) -> Result<Option<CacheEntry>> {
        if !key.is_get() {
            return Ok(None);
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: RequestKey, entry: CacheEntry) -> Result<()> {
        if !key.is_get() {
            return Err(CacheError::Storage(format!(
                "Only GET requests can be cached, got {}",
                key.method
            )));
        }

        let mut entries = self.entries.write().await;

        // Quota is enforced on actual body bytes, replacing an entry frees its old body
        if let Some(quota) = self.quota {
            let used: u64 = entries
                .iter()
                .filter(|(k, _)| *k != &key)
                .map(|(_, e)| e.response.body.len() as u64)
                .sum();
            let requested = entry.response.body.len() as u64;
            let available = quota.saturating_sub(used);
            if requested > available {
                return Err(CacheError::QuotaExceeded {
                    partition: self.name.clone(),
                    requested,
                    available,
                });
            }
        }

        entries.insert(key, entry);
        Ok(())
    }

    async fn delete(&self, key: &RequestKey) -> Result<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

// == Memory Storage ==
/// Registry of in-memory partitions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    partitions: RwLock<HashMap<String, Arc<MemoryPartition>>>,
    /// Per-partition body quota applied to newly opened partitions
    quota: Option<u64>,
}

impl MemoryStorage {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage whose partitions reject writes beyond `bytes` of body data.
    pub fn with_quota(bytes: u64) -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    /// Concrete handle to an existing partition, for inspection.
    pub async fn partition(&self, name: &str) -> Option<Arc<MemoryPartition>> {
        self.partitions.read().await.get(name).cloned()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn Partition>> {
        if let Some(existing) = self.partitions.read().await.get(name) {
            return Ok(existing.clone());
        }

        let mut partitions = self.partitions.write().await;
        let partition = partitions
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryPartition::new(name, self.quota)))
            .clone();
        Ok(partition)
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.partitions.read().await.contains_key(name))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.partitions.write().await.remove(name).is_some())
    }

    async fn names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.partitions.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
