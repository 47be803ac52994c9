//! Offline Cache Manager
//!
//! Ties the store, the network and the strategies together behind the events a
//! host delivers: install, activate, fetch, control messages and sync triggers.

mod maintenance;
mod state;

pub use maintenance::{
    MaintenancePlan, MaintenanceReport, MaintenanceStep, CLEANUP_TAG, MAINTENANCE_TAG,
};
pub use state::WorkerState;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::cache::{
    cleanup_expired, enforce_size_budget, partition_size, CacheEntry, CacheStats, CacheStorage,
    PartitionKind, PartitionSet, RequestKey, ServedFrom,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::http::{FetchRequest, HttpResponse};
use crate::models::{CacheSizeResponse, ControlMessage};
use crate::network::{fetch_with_timeout, Network};
use crate::strategy::{classify, Served, StrategyHandlers};

// == Fetch Outcome ==
/// What the host should do with an intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the host performs its normal network handling
    Passthrough(FetchRequest),
    /// Answer with this response
    Respond(Served),
}

// == Offline Cache ==
pub struct OfflineCache {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    config: Arc<Config>,
    origin: Url,
    partitions: PartitionSet,
    handlers: StrategyHandlers,
    state: RwLock<WorkerState>,
    stats: Arc<RwLock<CacheStats>>,
}

impl OfflineCache {
    // == Constructor ==
    pub fn new(
        config: Config,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Result<Self> {
        let origin = Url::parse(&config.origin_url).map_err(|e| {
            CacheError::Config(format!("Invalid origin URL '{}': {}", config.origin_url, e))
        })?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(CacheError::Config(format!(
                "Origin must be http(s), got '{}'",
                origin.scheme()
            )));
        }

        let config = Arc::new(config);
        let stats = Arc::new(RwLock::new(CacheStats::new()));
        let handlers =
            StrategyHandlers::new(storage.clone(), network.clone(), config.clone(), stats.clone());

        Ok(Self {
            storage,
            network,
            partitions: config.partitions(),
            config,
            origin,
            handlers,
            state: RwLock::new(WorkerState::Parsed),
            stats,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn partitions(&self) -> &PartitionSet {
        &self.partitions
    }

    pub fn storage(&self) -> Arc<dyn CacheStorage> {
        self.storage.clone()
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Resolves a path or absolute URL against the origin.
    ///
    /// Anything that resolves to a different origin is rejected.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        let url = self
            .origin
            .join(path)
            .map_err(|e| CacheError::InvalidRequest(format!("Invalid URL '{}': {}", path, e)))?;

        if url.origin() != self.origin.origin() {
            return Err(CacheError::InvalidRequest(format!(
                "URL '{}' is outside the origin {}",
                path,
                self.origin.origin().ascii_serialization()
            )));
        }
        Ok(url)
    }

    // == Install ==
    /// Primes the dynamic and static partitions, then sweeps.
    ///
    /// Any priming failure leaves the worker `Redundant`.
    pub async fn install(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if !state.can_install() {
                return Err(CacheError::InvalidState(format!(
                    "Cannot install from state '{}'",
                    *state
                )));
            }
            *state = WorkerState::Installing;
        }
        info!(version = self.partitions.version(), "Installing offline cache");

        let (essential, assets) = tokio::join!(
            self.prime(PartitionKind::Dynamic, &self.config.essential_urls),
            self.prime(PartitionKind::Static, &self.config.static_assets),
        );

        if let Err(e) = essential.and(assets) {
            error!(error = %e, "Installation failed");
            *self.state.write().await = WorkerState::Redundant;
            return Err(CacheError::Install(e.to_string()));
        }

        *self.state.write().await = WorkerState::Installed;
        self.run_plan(&MaintenancePlan::cleanup(&self.config)).await;
        info!("Installation complete");
        Ok(())
    }

    async fn prime(&self, kind: PartitionKind, paths: &[String]) -> Result<usize> {
        let urls = paths
            .iter()
            .map(|p| self.resolve(p))
            .collect::<Result<Vec<_>>>()?;
        self.add_all(kind, urls).await
    }

    /// Fetches every URL and stores them all, or stores nothing if any fetch fails.
    async fn add_all(&self, kind: PartitionKind, urls: Vec<Url>) -> Result<usize> {
        let mut fetched = Vec::with_capacity(urls.len());
        for url in urls {
            let request = FetchRequest::new("GET", url.clone());
            let response =
                fetch_with_timeout(self.network.clone(), request, self.config.network_timeout)
                    .await?;
            if !response.is_success() {
                return Err(CacheError::Network(format!(
                    "{} responded with status {}",
                    url, response.status
                )));
            }
            fetched.push((RequestKey::get(&url), response));
        }

        let partition = self.storage.open(&self.partitions.name(kind)).await?;
        let count = fetched.len();
        for (key, response) in fetched {
            partition.put(key, CacheEntry::new(response)).await?;
        }
        debug!(partition = %kind, count, "Added URLs to cache");
        Ok(count)
    }

    // == Activate ==
    /// Deletes every partition outside the current versioned set and takes control.
    ///
    /// Returns the names of the deleted partitions.
    pub async fn activate(&self) -> Result<Vec<String>> {
        {
            let mut state = self.state.write().await;
            if !state.can_activate() {
                return Err(CacheError::InvalidState(format!(
                    "Cannot activate from state '{}'",
                    *state
                )));
            }
            *state = WorkerState::Activating;
        }
        info!("Activating offline cache");

        let mut deleted = Vec::new();
        match self.storage.names().await {
            Ok(names) => {
                for name in names {
                    if self.partitions.contains(&name) {
                        continue;
                    }
                    match self.storage.delete(&name).await {
                        Ok(_) => {
                            info!(partition = %name, "Deleting old cache");
                            deleted.push(name);
                        }
                        Err(e) => warn!(partition = %name, error = %e, "Failed to delete old cache"),
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to list caches during activation"),
        }

        *self.state.write().await = WorkerState::Activated;
        info!(deleted = deleted.len(), "Activation complete");
        Ok(deleted)
    }

    /// Activates immediately if installed and waiting. Returns whether it activated.
    pub async fn skip_waiting(&self) -> Result<bool> {
        if !self.state().await.can_activate() {
            return Ok(false);
        }
        self.activate().await?;
        Ok(true)
    }

    // == Fetch ==
    /// Intercepts one request. Never fails: total failure becomes the offline
    /// page (navigations) or a synthetic 503.
    pub async fn handle_fetch(&self, request: FetchRequest) -> FetchOutcome {
        if !request.is_http() || request.is_range() || !self.state().await.is_controlling() {
            debug!(url = %request.url, "Passing request through");
            self.stats.write().await.record_passthrough();
            return FetchOutcome::Passthrough(request);
        }

        let route = classify(&request.url);
        let navigate = request.is_navigation();
        let url = request.url.clone();

        let served = match self
            .handlers
            .handle(route.strategy, request, route.partition)
            .await
        {
            Ok(served) => served,
            Err(e) => {
                error!(url = %url, error = %e, "Fetch failed");
                self.offline_fallback(navigate).await
            }
        };

        self.stats.write().await.record_served(served.source);
        FetchOutcome::Respond(served)
    }

    async fn offline_fallback(&self, navigate: bool) -> Served {
        if navigate {
            if let Some(response) = self.cached_offline_page().await {
                return Served::new(response, ServedFrom::OfflinePage);
            }
        }
        Served::new(HttpResponse::offline(), ServedFrom::Offline)
    }

    async fn cached_offline_page(&self) -> Option<HttpResponse> {
        let url = self.resolve(&self.config.offline_page).ok()?;
        let name = self.partitions.name(PartitionKind::Dynamic);
        if !self.storage.has(&name).await.unwrap_or(false) {
            return None;
        }
        let partition = self.storage.open(&name).await.ok()?;
        match partition.get(&RequestKey::get(&url)).await {
            Ok(entry) => entry.map(|e| e.response),
            Err(e) => {
                warn!(error = %e, "Failed to read offline page");
                None
            }
        }
    }

    // == Control Messages ==
    /// Handles a message from the host. Only `GET_CACHE_SIZE` produces a reply.
    pub async fn handle_message(
        &self,
        message: ControlMessage,
    ) -> Result<Option<CacheSizeResponse>> {
        info!(message = message.kind(), "Received message");

        if let Some(reason) = message.validate() {
            return Err(CacheError::InvalidRequest(reason));
        }

        match message {
            ControlMessage::SkipWaiting => {
                self.skip_waiting().await?;
                Ok(None)
            }
            ControlMessage::CacheUrls { urls } => {
                let urls = urls
                    .iter()
                    .map(|u| self.resolve(u))
                    .collect::<Result<Vec<_>>>()?;
                if !urls.is_empty() {
                    self.add_all(PartitionKind::Dynamic, urls).await?;
                }
                Ok(None)
            }
            ControlMessage::ClearCache => {
                self.clear().await?;
                Ok(None)
            }
            ControlMessage::GetCacheSize => {
                Ok(Some(CacheSizeResponse::new(self.cache_size().await?)))
            }
        }
    }

    /// Deletes every partition in storage. Returns how many were deleted.
    pub async fn clear(&self) -> Result<usize> {
        let mut deleted = 0;
        for name in self.storage.names().await? {
            if self.storage.delete(&name).await? {
                deleted += 1;
            }
        }
        info!(deleted, "Cleared all caches");
        Ok(deleted)
    }

    /// Declared bytes across every partition in storage.
    pub async fn cache_size(&self) -> Result<u64> {
        let mut total = 0;
        for name in self.storage.names().await? {
            // Deleted since listing
            if !self.storage.has(&name).await? {
                continue;
            }
            let partition = self.storage.open(&name).await?;
            total += partition_size(partition.as_ref()).await;
        }
        Ok(total)
    }

    // == Sync Triggers ==
    /// Background sync event. Returns whether the tag was recognised.
    pub async fn handle_sync(&self, tag: &str) -> bool {
        info!(tag, "Background sync triggered");
        if tag != CLEANUP_TAG {
            return false;
        }
        self.run_plan(&MaintenancePlan::cleanup(&self.config)).await;
        true
    }

    /// Periodic sync event. Returns whether the tag was recognised.
    pub async fn handle_periodic_sync(&self, tag: &str) -> bool {
        if tag != MAINTENANCE_TAG {
            debug!(tag, "Ignoring periodic sync");
            return false;
        }
        self.run_plan(&MaintenancePlan::periodic(&self.config)).await;
        true
    }

    /// Runs each step against its partition. Partitions that do not exist are skipped.
    pub async fn run_plan(&self, plan: &MaintenancePlan) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        for step in &plan.steps {
            let kind = match step {
                MaintenanceStep::Expire { kind, .. } | MaintenanceStep::Trim { kind, .. } => *kind,
            };
            let name = self.partitions.name(kind);

            match self.storage.has(&name).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    error!(partition = %name, error = %e, "Error checking cache");
                    continue;
                }
            }
            let partition = match self.storage.open(&name).await {
                Ok(partition) => partition,
                Err(e) => {
                    error!(partition = %name, error = %e, "Error opening cache");
                    continue;
                }
            };

            match step {
                MaintenanceStep::Expire { max_age, .. } => {
                    report.expired += cleanup_expired(partition.as_ref(), *max_age).await;
                }
                MaintenanceStep::Trim { max_bytes, .. } => {
                    report.evicted += enforce_size_budget(partition.as_ref(), *max_bytes).await;
                }
            }
        }

        {
            let mut stats = self.stats.write().await;
            stats.record_expired(report.expired);
            stats.record_evictions(report.evicted);
        }
        debug!(expired = report.expired, evicted = report.evicted, "Maintenance complete");
        report
    }
}
