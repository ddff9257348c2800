//! Cache Manager Module
//!
//! Two-tier TTL cache: a volatile in-process map in front of an optional
//! durable store. The durable tier is a best-effort mirror; any failure
//! there is logged and the volatile tier keeps serving.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::{current_timestamp_ms, CacheEntry, CacheStats, HitCounter};
use crate::config::{Config, DEFAULT_KEY_PREFIX};
use crate::durable::{DurableStore, FileStore};

type Gate = Arc<tokio::sync::Mutex<()>>;

// == Cache Manager ==
/// Shared TTL cache. Construct once at startup and hand out `Arc<CacheManager>`.
pub struct CacheManager {
    /// Volatile tier
    memory: Mutex<HashMap<String, CacheEntry>>,
    /// Durable tier, absent in memory-only mode
    durable: Option<Arc<dyn DurableStore>>,
    /// Namespace for durable keys
    key_prefix: String,
    /// TTL for writes that do not name one
    default_ttl: Duration,
    counter: HitCounter,
    /// Per-key gates serializing concurrent preloads
    inflight: Mutex<HashMap<String, Gate>>,
}

impl CacheManager {
    // == Constructors ==
    /// Creates a memory-only cache.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            durable: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            default_ttl,
            counter: HitCounter::new(),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a cache that mirrors writes into `store`.
    pub fn with_durable<S>(store: Arc<S>, default_ttl: Duration) -> Self
    where
        S: DurableStore + 'static,
    {
        let store: Arc<dyn DurableStore> = store;
        Self {
            durable: Some(store),
            ..Self::new(default_ttl)
        }
    }

    /// Replaces the durable namespace prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Builds a cache from configuration.
    ///
    /// Falls back to memory-only when persistence is disabled or no cache
    /// directory can be resolved.
    pub fn from_config(config: &Config) -> Self {
        let store = if config.persist {
            match &config.cache_dir {
                Some(dir) => Some(FileStore::with_dir(dir)),
                None => FileStore::new(),
            }
        } else {
            None
        };

        let cache = match store {
            Some(store) => {
                info!(
                    "Cache initialized: persistent at {}, default_ttl={}ms",
                    store.dir().display(),
                    config.default_ttl.as_millis()
                );
                Self::with_durable(Arc::new(store), config.default_ttl)
            }
            None => {
                if config.persist {
                    warn!("No cache directory available, running memory-only");
                }
                info!(
                    "Cache initialized: memory-only, default_ttl={}ms",
                    config.default_ttl.as_millis()
                );
                Self::new(config.default_ttl)
            }
        };
        cache.with_key_prefix(config.key_prefix.clone())
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Returns true if a durable tier is attached.
    pub fn is_persistent(&self) -> bool {
        self.durable.is_some()
    }

    // == Set ==
    /// Stores `data` under `key` for `ttl` (configured default when `None`).
    ///
    /// Overwrites any previous entry. The durable write is best-effort and
    /// never affects the volatile write.
    pub fn set<T>(&self, key: &str, data: &T, ttl: Option<Duration>)
    where
        T: Serialize + ?Sized,
    {
        if key.is_empty() {
            warn!("Ignoring cache write with an empty key");
            return;
        }

        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Cache payload is not representable as JSON, write skipped");
                return;
            }
        };

        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));
        let persisted = self.durable.as_ref().map(|_| entry.encode());

        // Both tiers are written under the volatile lock so a racing
        // eviction cannot remove the durable copy of this write
        let mut memory = self.memory();
        memory.insert(key.to_string(), entry);
        debug!(key, "Cache set");

        match persisted {
            Some(Ok(raw)) => self.write_durable(key, &raw),
            Some(Err(e)) => warn!(key, error = %e, "Failed to encode cache entry for durable storage"),
            None => {}
        }
    }

    // == Get ==
    /// Returns the live value for `key`, or `None` on a miss.
    ///
    /// Checks the volatile tier, then the durable tier. A durable hit is
    /// promoted into the volatile tier; an expired entry is removed from
    /// both tiers.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let Some(value) = self.lookup(key) else {
            self.counter.record_miss();
            return None;
        };

        match serde_json::from_value(value) {
            Ok(data) => {
                self.counter.record_hit();
                Some(data)
            }
            Err(e) => {
                warn!(key, error = %e, "Cached value does not match the requested type");
                self.counter.record_miss();
                None
            }
        }
    }

    /// Returns true if `key` holds a live value. Counts as a lookup.
    pub fn contains(&self, key: &str) -> bool {
        let found = self.lookup(key).is_some();
        if found {
            self.counter.record_hit();
        } else {
            self.counter.record_miss();
        }
        found
    }

    // == Delete ==
    /// Removes `key` from both tiers. Missing keys are ignored.
    pub fn delete(&self, key: &str) {
        let mut memory = self.memory();
        memory.remove(key);
        self.remove_durable(key);
        debug!(key, "Cache delete");
    }

    // == Clear ==
    /// Empties the volatile tier and removes every prefixed durable key.
    ///
    /// Durable keys outside the namespace are left alone.
    pub fn clear(&self) {
        let mut memory = self.memory();
        memory.clear();

        let Some(store) = &self.durable else {
            return;
        };

        let keys = match store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to enumerate durable cache keys");
                return;
            }
        };

        let mut removed = 0;
        for durable_key in keys.iter().filter(|k| k.starts_with(&self.key_prefix)) {
            match store.remove_item(durable_key) {
                Ok(()) => removed += 1,
                Err(e) => warn!(key = %durable_key, error = %e, "Failed to remove durable cache entry"),
            }
        }
        debug!("Cache cleared, {} durable entries removed", removed);
    }

    // == Preload ==
    /// Fetches and caches `key` unless it already holds a live value.
    ///
    /// Concurrent preloads of the same key are serialized: later callers
    /// wait for the first to settle and skip the fetch if it succeeded.
    /// Fetch failures are logged and swallowed.
    pub async fn preload<T, F, Fut>(&self, key: &str, fetcher: F, ttl: Option<Duration>)
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        if self.contains(key) {
            debug!(key, "Preload skipped, value is live");
            return;
        }

        // Released on drop, so cancelled or panicking preloads clean up too
        let gate = GateRelease {
            cache: self,
            key,
            gate: self.acquire_gate(key),
        };
        let _guard = gate.gate.lock().await;

        if self.lookup(key).is_some() {
            debug!(key, "Preload skipped, filled by a concurrent preload");
            return;
        }

        match fetcher().await {
            Ok(data) => {
                self.set(key, &data, ttl);
                debug!(key, "Preload stored");
            }
            Err(e) => error!(key, error = ?e, "Cache preload failed"),
        }
    }

    // == Stats ==
    /// Returns occupancy of the volatile tier and hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        let now = current_timestamp_ms();
        let (total, active) = {
            let memory = self.memory();
            let active = memory.values().filter(|e| !e.is_expired_at(now)).count();
            (memory.len(), active)
        };
        let (hits, misses) = self.counter.snapshot();
        CacheStats::new(total, active, hits, misses)
    }

    /// Zeros the hit/miss counters.
    pub fn reset_stats(&self) {
        self.counter.reset();
    }

    // == Purge Expired ==
    /// Removes every expired volatile entry from both tiers.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut memory = self.memory();
        let expired_keys: Vec<String> = memory
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            memory.remove(key);
            self.remove_durable(key);
        }
        expired_keys.len()
    }

    // == Internals ==
    fn memory(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn durable_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Tiered lookup with promotion and lazy eviction. Does not count.
    ///
    /// Runs entirely under the volatile lock: the expiry check and the
    /// removal from both tiers must not interleave with a `set`.
    fn lookup(&self, key: &str) -> Option<Value> {
        let now = current_timestamp_ms();
        let mut memory = self.memory();

        if let Some(entry) = memory.get(key) {
            if !entry.is_expired_at(now) {
                debug!(key, "Cache hit (memory)");
                return Some(entry.data.clone());
            }
            memory.remove(key);
            debug!(key, "Cache entry expired, evicting");
            self.remove_durable(key);
            return None;
        }

        let entry = self.read_durable(key)?;
        if entry.is_expired_at(now) {
            debug!(key, "Durable cache entry expired, evicting");
            self.remove_durable(key);
            return None;
        }

        let data = entry.data.clone();
        memory.insert(key.to_string(), entry);
        debug!(key, "Cache hit (durable), promoted to memory");
        Some(data)
    }

    fn read_durable(&self, key: &str) -> Option<CacheEntry> {
        let store = self.durable.as_ref()?;
        let durable_key = self.durable_key(key);

        let raw = match store.get_item(&durable_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read durable cache entry");
                return None;
            }
        };

        // Corrupt payloads stay in place until overwritten, deleted, or cleared
        match CacheEntry::decode(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key, error = %e, "Corrupt durable cache entry, treating as miss");
                None
            }
        }
    }

    fn write_durable(&self, key: &str, raw: &str) {
        if let Some(store) = &self.durable {
            if let Err(e) = store.set_item(&self.durable_key(key), raw) {
                warn!(key, error = %e, "Failed to persist cache entry");
            }
        }
    }

    fn remove_durable(&self, key: &str) {
        if let Some(store) = &self.durable {
            if let Err(e) = store.remove_item(&self.durable_key(key)) {
                warn!(key, error = %e, "Failed to remove durable cache entry");
            }
        }
    }

    fn inflight(&self) -> MutexGuard<'_, HashMap<String, Gate>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire_gate(&self, key: &str) -> Gate {
        self.inflight()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drops the gate from the map once no other caller holds it.
    fn release_gate(&self, key: &str, gate: &Gate) {
        let mut inflight = self.inflight();
        let is_last = inflight
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, gate) && Arc::strong_count(gate) <= 2);
        if is_last {
            inflight.remove(key);
        }
    }
}

// == Gate Release ==
/// Returns a preload gate to the in-flight map when dropped.
struct GateRelease<'a> {
    cache: &'a CacheManager,
    key: &'a str,
    gate: Gate,
}

impl Drop for GateRelease<'_> {
    fn drop(&mut self) {
        self.cache.release_gate(self.key, &self.gate);
    }
}
