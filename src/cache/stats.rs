//! Cache Statistics Module
//!
//! Tracks lookup outcomes and reports volatile-tier occupancy.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time statistics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries currently held in the volatile tier (live or not)
    pub total: usize,
    /// Volatile entries that have not expired yet
    pub active: usize,
    /// Volatile entries past their expiry, awaiting lazy eviction
    pub expired: usize,
    /// Lookups that returned a live value since the last reset
    pub hits: u64,
    /// Lookups that returned nothing since the last reset
    pub misses: u64,
    /// hits / (hits + misses), or 0.0 if no lookups have been made
    pub hit_rate: f64,
}

impl CacheStats {
    // == Constructor ==
    /// Builds a snapshot from occupancy and counter readings.
    pub fn new(total: usize, active: usize, hits: u64, misses: u64) -> Self {
        Self {
            total,
            active,
            expired: total.saturating_sub(active),
            hits,
            misses,
            hit_rate: hit_rate(hits, misses),
        }
    }
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

// == Hit Counter ==
/// Lock-free hit/miss counters shared by concurrent readers.
#[derive(Debug, Default)]
pub struct HitCounter {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns `(hits, misses)`.
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
