//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's behavioural guarantees over random
//! keys, payloads and operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{CacheManager, TtlTier, DEFAULT_TTL};
use crate::durable::{DurableStore, MemoryStore};

// == Strategies ==
/// Generates valid cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,32}".prop_map(|s| s)
}

/// Generates arbitrary JSON-friendly payloads
fn payload_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9 ]{0,24}", 0..8)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Vec<String> },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), payload_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn persistent_cache() -> (CacheManager, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (CacheManager::with_durable(store.clone(), DEFAULT_TTL), store)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hit/miss counters match the outcomes observed by callers.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let (cache, _store) = persistent_cache();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut live: HashSet<String> = HashSet::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(&key, &value, None);
                    live.insert(key);
                }
                CacheOp::Get { key } => match cache.get::<Vec<String>>(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    cache.delete(&key);
                    live.remove(&key);
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total, live.len(), "Total entries mismatch");
        prop_assert_eq!(stats.active, live.len());
    }

    // A value read back before expiry is the value that was stored.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in payload_strategy()) {
        let (cache, _store) = persistent_cache();

        cache.set(&key, &value, Some(TtlTier::Long.duration()));

        prop_assert_eq!(cache.get::<Vec<String>>(&key), Some(value));
    }

    // The persisted copy alone is enough to serve a fresh process.
    #[test]
    fn prop_durable_copy_survives_restart(key in valid_key_strategy(), value in payload_strategy()) {
        let store = Arc::new(MemoryStore::new());
        CacheManager::with_durable(store.clone(), DEFAULT_TTL).set(&key, &value, None);

        let restarted = CacheManager::with_durable(store, DEFAULT_TTL);
        prop_assert_eq!(restarted.get::<Vec<String>>(&key), Some(value));
        prop_assert_eq!(restarted.stats().total, 1);
    }

    // Delete removes the key from both tiers.
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in payload_strategy()) {
        let (cache, store) = persistent_cache();

        cache.set(&key, &value, None);
        prop_assert!(cache.contains(&key));

        cache.delete(&key);

        prop_assert!(cache.get::<Vec<String>>(&key).is_none());
        prop_assert!(store.is_empty());
    }

    // A second set fully replaces the first.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in payload_strategy(),
        value2 in payload_strategy()
    ) {
        let (cache, _store) = persistent_cache();

        cache.set(&key, &value1, None);
        cache.set(&key, &value2, None);

        prop_assert_eq!(cache.get::<Vec<String>>(&key), Some(value2));
        prop_assert_eq!(cache.stats().total, 1);
    }

    // Clear removes every cache key and nothing else.
    #[test]
    fn prop_clear_preserves_foreign_keys(
        cache_keys in prop::collection::vec(valid_key_strategy(), 0..10),
        foreign_keys in prop::collection::hash_set("[A-Z][a-z]{1,10}", 0..5)
    ) {
        let (cache, store) = persistent_cache();
        for key in &foreign_keys {
            store.set_item(key, "keep").unwrap();
        }
        for key in &cache_keys {
            cache.set(key, &1, None);
        }

        cache.clear();
        cache.clear();

        let remaining: HashSet<String> = store.keys().unwrap().into_iter().collect();
        prop_assert_eq!(remaining, foreign_keys);
        prop_assert_eq!(cache.stats().total, 0);
        for key in &cache_keys {
            prop_assert!(cache.get::<i32>(key).is_none());
        }
    }

    // Preload never refetches a live key.
    #[test]
    fn prop_preload_skips_live_keys(key in valid_key_strategy(), value in payload_strategy()) {
        let (cache, _store) = persistent_cache();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        cache.set(&key, &value, Some(TtlTier::Long.duration()));
        tokio_test::block_on(cache.preload(
            &key,
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<Vec<String>, _>(anyhow::anyhow!("should not be called"))
            },
            None,
        ));

        prop_assert_eq!(calls.load(Ordering::SeqCst), 0);
        prop_assert_eq!(cache.get::<Vec<String>>(&key), Some(value));
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Live before the TTL elapses, gone from both tiers after.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        value in payload_strategy()
    ) {
        let (cache, store) = persistent_cache();

        cache.set(&key, &value, Some(Duration::from_millis(50)));

        prop_assert_eq!(cache.get::<Vec<String>>(&key), Some(value));

        sleep(Duration::from_millis(60));

        prop_assert!(cache.get::<Vec<String>>(&key).is_none());
        prop_assert_eq!(cache.stats().total, 0);
        prop_assert!(store.is_empty());
    }
}
