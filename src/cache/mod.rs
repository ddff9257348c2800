//! Cache Module
//!
//! Dual-tier TTL caching: an in-memory tier in front of an optional
//! durable tier, with lazy expiry and hit/miss statistics.

mod entry;
pub mod keys;
mod manager;
mod stats;
mod ttl;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use manager::CacheManager;
pub use stats::{CacheStats, HitCounter};
pub use ttl::{TtlTier, DEFAULT_TTL};
