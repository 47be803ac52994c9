//! Eviction Primitives
//!
//! Age-based sweeps and byte-budget enforcement over a single partition.
//! Both are best-effort: store errors are logged and the pass continues or
//! stops, but never propagates.

use std::time::Duration;

use tracing::{debug, error, info};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::storage::{Partition, RequestKey};

// == Cleanup Expired ==
/// Removes every entry that is unstamped or older than `max_age`.
///
/// Returns the number of entries removed.
pub async fn cleanup_expired(partition: &dyn Partition, max_age: Duration) -> usize {
    cleanup_expired_at(partition, max_age, current_timestamp_ms()).await
}

pub async fn cleanup_expired_at(partition: &dyn Partition, max_age: Duration, now_ms: u64) -> usize {
    let keys = match partition.keys().await {
        Ok(keys) => keys,
        Err(e) => {
            error!(partition = partition.name(), error = %e, "Error cleaning up cache");
            return 0;
        }
    };

    let mut removed = 0;
    for key in keys {
        // An entry may disappear between listing and lookup
        let entry = match partition.get(&key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(e) => {
                error!(partition = partition.name(), key = %key, error = %e, "Error reading cache entry");
                continue;
            }
        };

        if entry.meta.is_expired_at(max_age, now_ms) {
            match partition.delete(&key).await {
                Ok(true) => {
                    removed += 1;
                    debug!(partition = partition.name(), url = %key.url, "Cleaned up expired cache entry");
                }
                Ok(false) => {}
                Err(e) => {
                    error!(partition = partition.name(), key = %key, error = %e, "Error deleting cache entry")
                }
            }
        }
    }

    if removed > 0 {
        info!(partition = partition.name(), removed, "Expiry sweep removed entries");
    }
    removed
}

// == Partition Size ==
/// Sum of declared sizes of all entries. Entries without a content-length add zero.
pub async fn partition_size(partition: &dyn Partition) -> u64 {
    let mut total = 0;
    for (_, size, _) in sized_entries(partition).await {
        total += size;
    }
    total
}

// == Enforce Size Budget ==
/// Deletes oldest-inserted entries until the declared total is at or below `max_bytes`.
///
/// Unstamped entries sort as oldest. Returns the number of entries removed.
pub async fn enforce_size_budget(partition: &dyn Partition, max_bytes: u64) -> usize {
    let mut entries = sized_entries(partition).await;
    let total: u64 = entries.iter().map(|(_, size, _)| size).sum();

    if total <= max_bytes {
        debug!(partition = partition.name(), total, max_bytes, "Partition within size budget");
        return 0;
    }

    // Stable sort keeps listing order among equal timestamps
    entries.sort_by_key(|(_, _, inserted_at)| *inserted_at);

    let mut remaining = total;
    let mut removed = 0;
    for (key, size, _) in entries {
        if remaining <= max_bytes {
            break;
        }
        match partition.delete(&key).await {
            Ok(_) => {
                remaining = remaining.saturating_sub(size);
                removed += 1;
                debug!(partition = partition.name(), url = %key.url, size, "Removed cache entry for size management");
            }
            Err(e) => {
                error!(partition = partition.name(), key = %key, error = %e, "Error managing cache size");
                break;
            }
        }
    }

    info!(
        partition = partition.name(),
        removed,
        before = total,
        after = remaining,
        max_bytes,
        "Size budget enforced"
    );
    removed
}

/// Lists `(key, accounted size, insertion timestamp or 0)` for every readable entry.
async fn sized_entries(partition: &dyn Partition) -> Vec<(RequestKey, u64, u64)> {
    let keys = match partition.keys().await {
        Ok(keys) => keys,
        Err(e) => {
            error!(partition = partition.name(), error = %e, "Error listing cache entries");
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        match partition.get(&key).await {
            Ok(Some(entry)) => entries.push((
                key,
                entry.meta.accounted_size(),
                entry.meta.inserted_at.unwrap_or(0),
            )),
            Ok(None) => {}
            Err(e) => {
                error!(partition = partition.name(), key = %key, error = %e, "Error reading cache entry");
            }
        }
    }
    entries
}
