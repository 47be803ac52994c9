//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use offline_cache::cache::MemoryStorage;
use offline_cache::http::{FetchRequest, HttpResponse};
use offline_cache::network::Network;
use offline_cache::{CacheError, Config, OfflineCache, Result};

pub const ORIGIN: &str = "https://docs.example.com";

/// Answers every path with `body of <path>` until switched offline.
#[derive(Default)]
pub struct FakeNetwork {
    offline: AtomicBool,
    delay: Mutex<Duration>,
    missing: Mutex<HashSet<String>>,
    requested: Mutex<Vec<String>>,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delays every answer.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Makes a path answer 404.
    pub fn remove(&self, path: &str) {
        self.missing.lock().unwrap().insert(path.to_string());
    }

    /// Absolute URLs fetched so far.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

pub fn body_for(path: &str) -> String {
    format!("body of {}", path)
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<HttpResponse> {
        let path = request.url.path().to_string();
        self.requested.lock().unwrap().push(request.url.to_string());

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::Network("connection refused".to_string()));
        }
        if self.missing.lock().unwrap().contains(&path) {
            return Ok(HttpResponse::new(404, "not found"));
        }

        let body = body_for(&path);
        Ok(HttpResponse::new(200, body.clone())
            .header("content-type", "text/html")
            .header("content-length", body.len().to_string())
            .append_header("set-cookie", "session=1")
            .append_header("set-cookie", "theme=dark"))
    }
}

pub fn test_config(version: &str) -> Config {
    Config {
        origin_url: ORIGIN.to_string(),
        cache_version: version.to_string(),
        network_timeout: Duration::from_millis(500),
        api_timeout: Duration::from_millis(200),
        essential_urls: vec![
            "/".to_string(),
            "/docs/intro".to_string(),
            "/offline.html".to_string(),
        ],
        static_assets: vec!["/assets/main.css".to_string(), "/favicon.ico".to_string()],
        ..Config::default()
    }
}

pub struct Harness {
    pub cache: Arc<OfflineCache>,
    pub storage: Arc<MemoryStorage>,
    pub network: Arc<FakeNetwork>,
}

impl Harness {
    pub fn new(version: &str) -> Self {
        Self::with_storage(version, Arc::new(MemoryStorage::new()))
    }

    pub fn with_storage(version: &str, storage: Arc<MemoryStorage>) -> Self {
        let network = FakeNetwork::new();
        let cache =
            OfflineCache::new(test_config(version), storage.clone(), network.clone()).unwrap();
        Self {
            cache: Arc::new(cache),
            storage,
            network,
        }
    }

    /// Installed and activated, with the network still online.
    pub async fn active(version: &str) -> Self {
        let harness = Self::new(version);
        harness.cache.install().await.unwrap();
        harness.cache.activate().await.unwrap();
        harness
    }

    pub fn request(&self, path: &str) -> FetchRequest {
        FetchRequest::get(&format!("{}{}", ORIGIN, path)).unwrap()
    }
}
