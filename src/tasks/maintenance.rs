//! Cache Maintenance Task
//!
//! Background task that periodically delivers the `cache-maintenance` event.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::worker::{OfflineCache, MAINTENANCE_TAG};

/// Spawns a background task that periodically runs cache maintenance.
///
/// The task sleeps for the interval, then delivers the periodic sync event to
/// the manager, which sweeps expired entries and enforces the dynamic budget.
///
/// # Arguments
/// * `cache` - shared manager
/// * `interval_secs` - Interval in seconds between maintenance runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_maintenance_task(cache.clone(), 3600);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_maintenance_task(cache: Arc<OfflineCache>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache maintenance task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            if !cache.state().await.is_controlling() {
                debug!("Cache maintenance skipped: worker not active");
                continue;
            }

            let before = cache.stats().await;
            cache.handle_periodic_sync(MAINTENANCE_TAG).await;
            let after = cache.stats().await;

            let removed = (after.expired - before.expired) + (after.evictions - before.evictions);
            if removed > 0 {
                info!("Cache maintenance: removed {} entries", removed);
            } else {
                debug!("Cache maintenance: nothing to remove");
            }
        }
    })
}
