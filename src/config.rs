//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{PartitionKind, PartitionSet, MAX_CACHE_SIZE};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Routes primed into the dynamic partition on install.
pub const DEFAULT_ESSENTIAL_URLS: &[&str] = &[
    "/",
    "/docs/intro",
    "/docs/getting-started/installation",
    "/docs/getting-started/authentication",
    "/manifest.json",
    "/offline.html",
];

/// Brand, font and icon assets primed into the static partition on install.
pub const DEFAULT_STATIC_ASSETS: &[&str] = &[
    "/fonts/Mona-Sans.var.woff2",
    "/favicon.ico",
    "/img/favicon-16x16.png",
    "/img/favicon-32x32.png",
    "/img/icon-192x192.png",
    "/img/icon-384x384.png",
    "/img/icon-512x512.png",
    "/img/apple-touch-icon.png",
    "/img/icon.svg",
    "/img/logo.svg",
    "/img/logo-dark.svg",
];

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Origin the proxy fetches from
    pub origin_url: String,
    /// Partition name prefix
    pub cache_prefix: String,
    /// Build version token appended to partition names
    pub cache_version: String,
    /// Timeout for cache-first, network-first and revalidation fetches
    pub network_timeout: Duration,
    /// Timeout for network-first-short (API) fetches
    pub api_timeout: Duration,
    /// Periodic maintenance interval in seconds
    pub maintenance_interval: u64,
    /// Global byte ceiling the partition budgets are fractions of
    pub max_cache_size: u64,
    /// Max age of static entries
    pub static_max_age: Duration,
    /// Max age of dynamic entries
    pub dynamic_max_age: Duration,
    /// Max age of api entries
    pub api_max_age: Duration,
    /// Max age of image entries
    pub images_max_age: Duration,
    /// Paths primed into the dynamic partition
    pub essential_urls: Vec<String>,
    /// Paths primed into the static partition
    pub static_assets: Vec<String>,
    /// Path of the offline fallback page (must be one of the essential URLs to be useful)
    pub offline_page: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `ORIGIN_URL` - Upstream origin (default: http://127.0.0.1:8080)
    /// - `CACHE_PREFIX` - Partition name prefix (default: docs)
    /// - `CACHE_VERSION` - Build version token (default: v1.0.0)
    /// - `NETWORK_TIMEOUT_MS` - Default fetch timeout (default: 5000)
    /// - `API_TIMEOUT_MS` - API fetch timeout (default: 3000)
    /// - `MAINTENANCE_INTERVAL` - Maintenance frequency in seconds (default: 3600)
    /// - `MAX_CACHE_SIZE` - Global byte ceiling (default: 50 MB)
    /// - `ESSENTIAL_URLS` - Comma-separated paths primed on install
    /// - `STATIC_ASSETS` - Comma-separated paths primed on install
    /// - `OFFLINE_PAGE` - Offline fallback path (default: /offline.html)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            origin_url: env::var("ORIGIN_URL").unwrap_or(defaults.origin_url),
            cache_prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.cache_prefix),
            cache_version: env::var("CACHE_VERSION").unwrap_or(defaults.cache_version),
            network_timeout: parse_var("NETWORK_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.network_timeout),
            api_timeout: parse_var("API_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.api_timeout),
            maintenance_interval: parse_var("MAINTENANCE_INTERVAL")
                .unwrap_or(defaults.maintenance_interval),
            max_cache_size: parse_var("MAX_CACHE_SIZE").unwrap_or(defaults.max_cache_size),
            essential_urls: list_var("ESSENTIAL_URLS").unwrap_or(defaults.essential_urls),
            static_assets: list_var("STATIC_ASSETS").unwrap_or(defaults.static_assets),
            offline_page: env::var("OFFLINE_PAGE").unwrap_or(defaults.offline_page),
            ..defaults
        }
    }

    pub fn partitions(&self) -> PartitionSet {
        PartitionSet::new(&self.cache_prefix, &self.cache_version)
    }

    pub fn max_age(&self, kind: PartitionKind) -> Duration {
        match kind {
            PartitionKind::Static => self.static_max_age,
            PartitionKind::Dynamic => self.dynamic_max_age,
            PartitionKind::Api => self.api_max_age,
            PartitionKind::Images => self.images_max_age,
        }
    }

    /// Fraction of the global ceiling, in bytes.
    pub fn budget(&self, fraction: f64) -> u64 {
        (self.max_cache_size as f64 * fraction) as u64
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            origin_url: "http://127.0.0.1:8080".to_string(),
            cache_prefix: "docs".to_string(),
            cache_version: "v1.0.0".to_string(),
            network_timeout: Duration::from_millis(5000),
            api_timeout: Duration::from_millis(3000),
            maintenance_interval: 3600,
            max_cache_size: MAX_CACHE_SIZE,
            static_max_age: 30 * DAY,
            dynamic_max_age: 7 * DAY,
            api_max_age: Duration::from_secs(60 * 60),
            images_max_age: 30 * DAY,
            essential_urls: DEFAULT_ESSENTIAL_URLS.iter().map(|s| s.to_string()).collect(),
            static_assets: DEFAULT_STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            offline_page: "/offline.html".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn list_var(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.network_timeout, Duration::from_secs(5));
        assert_eq!(config.api_timeout, Duration::from_secs(3));
        assert_eq!(config.max_age(PartitionKind::Static), 30 * DAY);
        assert_eq!(config.max_age(PartitionKind::Images), 30 * DAY);
        assert_eq!(config.max_age(PartitionKind::Dynamic), 7 * DAY);
        assert_eq!(config.max_age(PartitionKind::Api), Duration::from_secs(3600));
        assert!(config.essential_urls.contains(&config.offline_page));
    }

    #[test]
    fn test_budget_fractions() {
        let config = Config::default();
        assert_eq!(config.budget(1.0), 50 * 1024 * 1024);
        assert_eq!(config.budget(0.4), 20_971_520);
        assert_eq!(config.budget(0.3), 15_728_640);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("CACHE_VERSION");
        env::remove_var("ESSENTIAL_URLS");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_version, "v1.0.0");
        assert_eq!(config.essential_urls.len(), DEFAULT_ESSENTIAL_URLS.len());
    }

    #[test]
    fn test_list_var_parsing() {
        env::set_var("OFFLINE_CACHE_TEST_LIST", " /a, /b ,,/c ");
        assert_eq!(
            list_var("OFFLINE_CACHE_TEST_LIST"),
            Some(vec!["/a".to_string(), "/b".to_string(), "/c".to_string()])
        );
        env::remove_var("OFFLINE_CACHE_TEST_LIST");
    }
}
