//! Strategy Handlers
//!
//! Each handler reads and writes only the partition its request was classified
//! into, and stamps every response before writing it. Cache read and write
//! failures are logged and treated as a miss or a skipped write; they never fail
//! the request.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheEntry, CacheStats, CacheStorage, PartitionKind, PartitionSet, RequestKey, ServedFrom,
};
use crate::config::Config;
use crate::error::Result;
use crate::http::{FetchRequest, HttpResponse};
use crate::network::{fetch_with_timeout, Network};
use crate::strategy::{Served, Strategy};

/// Shared handles the strategies operate on. Cheap to clone.
#[derive(Clone)]
pub struct StrategyHandlers {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    config: Arc<Config>,
    partitions: PartitionSet,
    stats: Arc<RwLock<CacheStats>>,
}

impl StrategyHandlers {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        config: Arc<Config>,
        stats: Arc<RwLock<CacheStats>>,
    ) -> Self {
        let partitions = config.partitions();
        Self {
            storage,
            network,
            config,
            partitions,
            stats,
        }
    }

    // == Dispatch ==
    pub async fn handle(
        &self,
        strategy: Strategy,
        request: FetchRequest,
        kind: PartitionKind,
    ) -> Result<Served> {
        debug!(url = %request.url, strategy = %strategy, partition = %kind, "Dispatching request");

        match strategy {
            Strategy::CacheFirst => self.cache_first(request, kind).await,
            Strategy::NetworkFirst => {
                self.network_first(request, kind, self.config.network_timeout, false)
                    .await
            }
            Strategy::NetworkFirstShort => {
                self.network_first(request, kind, self.config.api_timeout, true)
                    .await
            }
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request, kind).await,
        }
    }

    // == Cache First ==
    /// Fresh cache entry, else network, else whatever stale entry exists.
    pub async fn cache_first(&self, request: FetchRequest, kind: PartitionKind) -> Result<Served> {
        let key = RequestKey::from(&request);
        let cached = self.lookup(kind, &key).await;
        let max_age = self.config.max_age(kind);

        if let Some(entry) = &cached {
            if !entry.is_expired(max_age) {
                return Ok(Served::new(entry.response.clone(), ServedFrom::Cache));
            }
        }

        match self.fetch(request, self.config.network_timeout).await {
            Ok(response) => {
                self.store(kind, key, &response).await;
                Ok(Served::network(response))
            }
            Err(e) => match cached {
                Some(entry) => {
                    info!(url = %key.url, "Serving stale cache due to network error");
                    Ok(Served::new(entry.response, ServedFrom::StaleCache))
                }
                None => Err(e),
            },
        }
    }

    // == Network First ==
    /// Network within `timeout`, else the cached entry.
    ///
    /// With `honor_max_age` an expired entry is not used and the failure propagates.
    pub async fn network_first(
        &self,
        request: FetchRequest,
        kind: PartitionKind,
        timeout: Duration,
        honor_max_age: bool,
    ) -> Result<Served> {
        let key = RequestKey::from(&request);

        match self.fetch(request, timeout).await {
            Ok(response) => {
                self.store(kind, key, &response).await;
                Ok(Served::network(response))
            }
            Err(e) => {
                debug!(url = %key.url, error = %e, "Network failed, trying cache");
                let max_age = self.config.max_age(kind);

                match self.lookup(kind, &key).await {
                    Some(entry) if !entry.is_expired(max_age) => {
                        Ok(Served::new(entry.response, ServedFrom::Cache))
                    }
                    Some(entry) if !honor_max_age => {
                        Ok(Served::new(entry.response, ServedFrom::StaleCache))
                    }
                    _ => Err(e),
                }
            }
        }
    }

    // == Stale While Revalidate ==
    /// Cached entry immediately plus a background refresh, else wait on the network.
    pub async fn stale_while_revalidate(
        &self,
        request: FetchRequest,
        kind: PartitionKind,
    ) -> Result<Served> {
        let key = RequestKey::from(&request);

        let cached = self.lookup(kind, &key).await;
        if let Some(entry) = cached {
            let source = if entry.is_expired(self.config.max_age(kind)) {
                ServedFrom::StaleCache
            } else {
                ServedFrom::Cache
            };

            let handlers = self.clone();
            tokio::spawn(async move {
                handlers.revalidate(request, key, kind).await;
            });

            return Ok(Served::new(entry.response, source));
        }

        let response = self.fetch(request, self.config.network_timeout).await?;
        self.store(kind, key, &response).await;
        Ok(Served::network(response))
    }

    /// Background half of stale-while-revalidate. Failures are logged, never surfaced.
    async fn revalidate(&self, request: FetchRequest, key: RequestKey, kind: PartitionKind) {
        match self.fetch(request, self.config.network_timeout).await {
            Ok(response) => {
                self.store(kind, key, &response).await;
            }
            Err(e) => {
                warn!(url = %key.url, error = %e, "Background update failed");
                self.stats.write().await.record_background_failure();
            }
        }
    }

    // == Helpers ==
    async fn fetch(&self, request: FetchRequest, timeout: Duration) -> Result<HttpResponse> {
        fetch_with_timeout(self.network.clone(), request, timeout).await
    }

    /// Reads an entry without creating the partition. Read failures count as a miss.
    async fn lookup(&self, kind: PartitionKind, key: &RequestKey) -> Option<CacheEntry> {
        let name = self.partitions.name(kind);
        match self.storage.has(&name).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!(partition = %name, error = %e, "Failed to check cache partition");
                return None;
            }
        }

        let partition = match self.storage.open(&name).await {
            Ok(partition) => partition,
            Err(e) => {
                warn!(partition = %name, error = %e, "Failed to open cache partition");
                return None;
            }
        };
        match partition.get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(partition = %name, key = %key, error = %e, "Cache read failed");
                None
            }
        }
    }

    /// Writes a successful GET response with a fresh timestamp, creating the
    /// partition if needed. Failures are logged only.
    async fn store(&self, kind: PartitionKind, key: RequestKey, response: &HttpResponse) {
        if !response.is_success() {
            debug!(url = %key.url, status = response.status, "Not caching unsuccessful response");
            return;
        }
        if !key.is_get() {
            debug!(url = %key.url, method = %key.method, "Not caching non-GET response");
            return;
        }

        let name = self.partitions.name(kind);
        let partition = match self.storage.open(&name).await {
            Ok(partition) => partition,
            Err(e) => {
                warn!(partition = %name, error = %e, "Failed to open cache partition");
                self.stats.write().await.record_write_failure();
                return;
            }
        };

        let url = key.url.clone();
        if let Err(e) = partition.put(key, CacheEntry::new(response.clone())).await {
            warn!(partition = %name, url = %url, error = %e, "Cache write failed");
            self.stats.write().await.record_write_failure();
        }
    }
}
