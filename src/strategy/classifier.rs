//! Request Classifier
//!
//! Maps a request URL to the partition it is cached in and the strategy used
//! to answer it. Only the URL path is inspected.

use url::Url;

use crate::cache::PartitionKind;
use crate::strategy::{Route, Strategy};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "ico"];
pub const STATIC_EXTENSIONS: &[&str] = &["css", "js", "woff", "woff2"];

/// Classifies a URL. Total and deterministic: the first matching rule wins and
/// unmatched paths fall through to network-first in the dynamic partition.
pub fn classify(url: &Url) -> Route {
    classify_path(url.path())
}

pub fn classify_path(path: &str) -> Route {
    if has_extension(path, IMAGE_EXTENSIONS) {
        return Route::new(PartitionKind::Images, Strategy::CacheFirst);
    }

    if has_extension(path, STATIC_EXTENSIONS) {
        return Route::new(PartitionKind::Static, Strategy::CacheFirst);
    }

    if path.contains("/api/") {
        return Route::new(PartitionKind::Api, Strategy::NetworkFirstShort);
    }

    if path.contains("/docs/") || path.contains("/community/") {
        return Route::new(PartitionKind::Dynamic, Strategy::StaleWhileRevalidate);
    }

    Route::new(PartitionKind::Dynamic, Strategy::NetworkFirst)
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    match path.rsplit_once('.') {
        // A dot inside an earlier segment is not an extension
        Some((_, ext)) if !ext.contains('/') => extensions.contains(&ext),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_before_static() {
        let route = classify_path("/img/logo.svg");
        assert_eq!(route.partition, PartitionKind::Images);
        assert_eq!(route.strategy, Strategy::CacheFirst);

        let route = classify_path("/favicon.ico");
        assert_eq!(route.partition, PartitionKind::Images);
    }

    #[test]
    fn test_static_assets() {
        for path in ["/assets/main.css", "/assets/app.js", "/fonts/a.woff", "/fonts/a.woff2"] {
            let route = classify_path(path);
            assert_eq!(route.partition, PartitionKind::Static, "{}", path);
            assert_eq!(route.strategy, Strategy::CacheFirst, "{}", path);
        }
    }

    #[test]
    fn test_extension_wins_over_path_segment() {
        let route = classify_path("/api/schema.js");
        assert_eq!(route.partition, PartitionKind::Static);

        let route = classify_path("/docs/diagram.png");
        assert_eq!(route.partition, PartitionKind::Images);
    }

    #[test]
    fn test_api_routes() {
        let route = classify_path("/v1/api/search");
        assert_eq!(route.partition, PartitionKind::Api);
        assert_eq!(route.strategy, Strategy::NetworkFirstShort);
    }

    #[test]
    fn test_docs_and_community() {
        for path in ["/docs/intro", "/site/community/support"] {
            let route = classify_path(path);
            assert_eq!(route.partition, PartitionKind::Dynamic);
            assert_eq!(route.strategy, Strategy::StaleWhileRevalidate);
        }
    }

    #[test]
    fn test_default_route() {
        for path in ["/", "/blog", "/docs", "/manifest.json", "/offline.html", "/api"] {
            let route = classify_path(path);
            assert_eq!(route.partition, PartitionKind::Dynamic, "{}", path);
            assert_eq!(route.strategy, Strategy::NetworkFirst, "{}", path);
        }
    }

    #[test]
    fn test_dot_in_directory_is_not_extension() {
        let route = classify_path("/v1.png/page");
        assert_eq!(route.strategy, Strategy::NetworkFirst);
    }

    #[test]
    fn test_query_string_ignored() {
        let url = Url::parse("https://docs.example.com/img/a.png?v=abc.html").unwrap();
        assert_eq!(classify(&url).partition, PartitionKind::Images);

        let url = Url::parse("https://docs.example.com/search?q=x.css").unwrap();
        assert_eq!(classify(&url).strategy, Strategy::NetworkFirst);
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let route = classify_path("/img/LOGO.PNG");
        assert_eq!(route.strategy, Strategy::NetworkFirst);
    }
}
