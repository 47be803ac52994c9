//! Request and Response models for the control surface
//!
//! This module defines the DTOs (Data Transfer Objects) exchanged between the
//! host page and the cache manager.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ControlMessage, MAX_CACHE_URLS};
pub use responses::{
    AcceptedResponse, CacheSizeResponse, HealthResponse, StatsResponse, SyncResponse,
};
