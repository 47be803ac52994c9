//! Cache Entry Module
//!
//! Defines stored responses and the metadata side-table record kept per entry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::http::HttpResponse;

// == Entry Metadata ==
/// Metadata tracked alongside a stored response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryMeta {
    /// Insertion timestamp (Unix milliseconds), None = unknown provenance
    pub inserted_at: Option<u64>,
    /// Declared size in bytes, None = no content-length on the response
    pub size: Option<u64>,
}

impl EntryMeta {
    // == Stamp ==
    /// Builds the metadata for a response about to be written now.
    pub fn stamped(response: &HttpResponse) -> Self {
        Self::stamped_at(response, current_timestamp_ms())
    }

    pub fn stamped_at(response: &HttpResponse, now_ms: u64) -> Self {
        Self {
            inserted_at: Some(now_ms),
            size: response.content_length(),
        }
    }

    // == Age ==
    /// Milliseconds since insertion, or None if the entry was never stamped.
    pub fn age_ms(&self, now_ms: u64) -> Option<u64> {
        self.inserted_at.map(|ts| now_ms.saturating_sub(ts))
    }

    // == Is Expired ==
    /// Checks whether the entry is older than `max_age`.
    ///
    /// Boundary condition: an entry is expired only when its age is strictly
    /// greater than `max_age`. Entries without a timestamp are always expired.
    pub fn is_expired_at(&self, max_age: Duration, now_ms: u64) -> bool {
        match self.age_ms(now_ms) {
            Some(age) => u128::from(age) > max_age.as_millis(),
            None => true,
        }
    }

    pub fn is_expired(&self, max_age: Duration) -> bool {
        self.is_expired_at(max_age, current_timestamp_ms())
    }

    /// Size used for budget accounting; missing content-length counts as zero.
    pub fn accounted_size(&self) -> u64 {
        self.size.unwrap_or(0)
    }
}

// == Cache Entry ==
/// A stored response plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub response: HttpResponse,
    pub meta: EntryMeta,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a freshly stamped entry for a response.
    pub fn new(response: HttpResponse) -> Self {
        let meta = EntryMeta::stamped(&response);
        Self { response, meta }
    }

    /// Creates an entry with explicit metadata.
    pub fn with_meta(response: HttpResponse, meta: EntryMeta) -> Self {
        Self { response, meta }
    }

    pub fn is_expired(&self, max_age: Duration) -> bool {
        self.meta.is_expired(max_age)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    #[test]
    fn test_stamped_entry_records_size_and_time() {
        let response = HttpResponse::new(200, "body").header("content-length", "4");
        let before = current_timestamp_ms();
        let entry = CacheEntry::new(response);

        assert!(entry.meta.inserted_at.unwrap() >= before);
        assert_eq!(entry.meta.size, Some(4));
        assert!(!entry.is_expired(HOUR));
    }

    #[test]
    fn test_missing_content_length_counts_as_zero() {
        let entry = CacheEntry::new(HttpResponse::new(200, "a body of unknown length"));
        assert_eq!(entry.meta.size, None);
        assert_eq!(entry.meta.accounted_size(), 0);
    }

    #[test]
    fn test_unstamped_entry_is_always_expired() {
        let meta = EntryMeta::default();
        assert!(meta.is_expired_at(Duration::from_secs(u64::MAX / 2000), 0));
        assert!(meta.age_ms(1_000).is_none());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = 10_000_000;
        let max_age = Duration::from_millis(1_000);
        let at_boundary = EntryMeta {
            inserted_at: Some(now - 1_000),
            size: None,
        };
        let past_boundary = EntryMeta {
            inserted_at: Some(now - 1_001),
            size: None,
        };

        assert!(!at_boundary.is_expired_at(max_age, now));
        assert!(past_boundary.is_expired_at(max_age, now));
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let meta = EntryMeta {
            inserted_at: Some(5_000),
            size: None,
        };
        assert_eq!(meta.age_ms(1_000), Some(0));
        assert!(!meta.is_expired_at(Duration::ZERO, 1_000));
    }
}
