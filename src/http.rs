//! HTTP Message Types
//!
//! Transport-neutral request and response values that flow between the
//! host surface, the strategy handlers, the network and the cache store.

use bytes::Bytes;
use url::Url;

use crate::error::{CacheError, Result};

/// Header used by browsers to flag byte-range requests.
pub const RANGE_HEADER: &str = "range";

/// Header carrying the declared body length.
pub const CONTENT_LENGTH_HEADER: &str = "content-length";

// == Headers ==
/// Ordered multi-map of lower-cased header names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `name`, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.0.push((name.to_ascii_lowercase(), value.into()));
    }

    /// Replaces every value for `name` with a single one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.remove(name);
        self.append(name, value);
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// == Request Mode ==
/// How the host issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    /// Subresource, XHR or anything else
    #[default]
    Other,
}

// == Fetch Request ==
/// An outgoing request intercepted from the host.
///
/// Header names are stored lower-cased. Repeated headers keep every value in
/// arrival order.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: String,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Bytes>,
    pub mode: RequestMode,
}

impl FetchRequest {
    /// Creates a GET request for an absolute URL.
    pub fn get(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| CacheError::InvalidRequest(format!("Invalid URL '{}': {}", url, e)))?;
        Ok(Self::new("GET", url))
    }

    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url,
            headers: Headers::new(),
            body: None,
            mode: RequestMode::Other,
        }
    }

    /// Sets a header, replacing any earlier values.
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(key.as_ref(), value);
        self
    }

    /// Adds a header value, keeping earlier ones.
    pub fn append_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.append(key.as_ref(), value);
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Case-insensitive header lookup. Returns the first value.
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// True when the request asks for a byte range of the resource.
    pub fn is_range(&self) -> bool {
        self.header_value(RANGE_HEADER)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }
}

// == HTTP Response ==
/// A complete, buffered HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Sets a header, replacing any earlier values.
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(key.as_ref(), value);
        self
    }

    /// Adds a header value, keeping earlier ones.
    pub fn append_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.append(key.as_ref(), value);
        self
    }

    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Declared body size from the `content-length` header.
    ///
    /// Responses without the header (chunked, opaque) report `None` even though
    /// their body is known; size accounting counts them as zero.
    pub fn content_length(&self) -> Option<u64> {
        self.header_value(CONTENT_LENGTH_HEADER)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Synthetic response used when neither the network nor the cache can answer.
    pub fn offline() -> Self {
        let mut response = Self::new(503, "Offline - Content not available")
            .header("content-type", "text/plain");
        response.status_text = "Service Unavailable".to_string();
        response
    }
}
