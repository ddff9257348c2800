//! Durable Tier
//!
//! A string key/value store that survives process restarts. The cache
//! mirrors every write into it on a best-effort basis.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

// == Durable Store ==
/// Minimal persisted key/value surface, shaped like browser local storage.
///
/// Implementations may be shared with unrelated consumers, so the cache
/// namespaces its own keys and never assumes it owns every item.
pub trait DurableStore: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Lists every key currently stored, including other consumers' keys.
    fn keys(&self) -> Result<Vec<String>>;
}
