//! Cache Module
//!
//! Partitioned response storage with timestamp metadata, expiry sweeps and
//! size-bounded eviction.

mod entry;
pub mod eviction;
mod memory;
mod partitions;
mod stats;
mod storage;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, EntryMeta};
pub use eviction::{cleanup_expired, enforce_size_budget, partition_size};
pub use memory::{MemoryPartition, MemoryStorage};
pub use partitions::{PartitionKind, PartitionSet};
pub use stats::{CacheStats, ServedFrom};
pub use storage::{CacheStorage, Partition, RequestKey};

// == Public Constants ==
/// Global ceiling the per-partition byte budgets are derived from
pub const MAX_CACHE_SIZE: u64 = 50 * 1024 * 1024; // 50 MB
