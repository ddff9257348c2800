//! Pitwall Cache - A dual-tier TTL cache for race data
//!
//! Fronts slow backend reads with an in-memory tier and a best-effort
//! persisted tier that survives restarts.

pub mod cache;
pub mod config;
pub mod durable;
pub mod error;
pub mod telemetry;

pub use cache::{CacheManager, CacheStats, TtlTier, DEFAULT_TTL};
pub use config::{Config, Environment};
pub use durable::{DurableStore, FileStore, MemoryStore};
pub use error::DurableError;
