//! Strategy Module
//!
//! Request classification and the four retrieval strategies.

mod classifier;
mod handlers;

pub use classifier::{classify, classify_path, IMAGE_EXTENSIONS, STATIC_EXTENSIONS};
pub use handlers::StrategyHandlers;

use std::fmt;

use serde::Serialize;

use crate::cache::{PartitionKind, ServedFrom};
use crate::http::HttpResponse;

// == Strategy ==
/// Read/write policy applied to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    NetworkFirstShort,
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::NetworkFirstShort => "network-first-short",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Route ==
/// Classification result: where a request is cached and how it is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub partition: PartitionKind,
    pub strategy: Strategy,
}

impl Route {
    pub fn new(partition: PartitionKind, strategy: Strategy) -> Self {
        Self {
            partition,
            strategy,
        }
    }
}

// == Served ==
/// A response together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub response: HttpResponse,
    pub source: ServedFrom,
}

impl Served {
    pub fn new(response: HttpResponse, source: ServedFrom) -> Self {
        Self { response, source }
    }

    pub fn network(response: HttpResponse) -> Self {
        Self::new(response, ServedFrom::Network)
    }
}
