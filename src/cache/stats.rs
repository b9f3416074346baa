//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses and invalidations.
//!
//! Counters live in a [`StatsRecorder`] backed by atomics so the hit path can
//! record through a shared reference (a read lock on the store) instead of
//! serializing all callers behind the write lock.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// A point-in-time snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of calls served from a fresh entry
    pub hits: u64,
    /// Number of calls that required a producer execution (missing or stale entry)
    pub misses: u64,
    /// Number of entries removed by tag or key invalidation
    pub invalidated_keys: u64,
    /// Number of expired entries removed by the background sweeper
    pub swept_entries: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Live counters behind atomics; snapshot into [`CacheStats`] on demand.
///
/// Relaxed ordering is enough: counters are independent and only ever read
/// as a snapshot, never used for synchronization.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    invalidated_keys: AtomicU64,
    swept_entries: AtomicU64,
}

impl StatsRecorder {
    /// Creates a recorder with all counters at zero.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Increments the hit counter.
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the miss counter.
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds to the invalidated-keys counter.
    pub(crate) fn record_invalidation(&self, count: usize) {
        self.invalidated_keys.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Adds to the swept-entries counter.
    pub(crate) fn record_sweep(&self, count: usize) {
        self.swept_entries.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Returns a snapshot of the counters plus the given entry count.
    pub(crate) fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidated_keys: self.invalidated_keys.load(Ordering::Relaxed),
            swept_entries: self.swept_entries.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_starts_at_zero() {
        let stats = StatsRecorder::new().snapshot(0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.invalidated_keys, 0);
        assert_eq!(stats.swept_entries, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let recorder = StatsRecorder::new();
        recorder.record_hit();
        recorder.record_miss();
        assert_eq!(recorder.snapshot(1).hit_rate(), 0.5);
    }

    #[test]
    fn test_record_invalidation_accumulates() {
        let recorder = StatsRecorder::new();
        recorder.record_invalidation(3);
        recorder.record_invalidation(2);
        assert_eq!(recorder.snapshot(0).invalidated_keys, 5);
    }

    #[test]
    fn test_record_sweep() {
        let recorder = StatsRecorder::new();
        recorder.record_sweep(4);
        assert_eq!(recorder.snapshot(0).swept_entries, 4);
    }

    #[test]
    fn test_recording_through_shared_reference() {
        // Hit/miss recording must not require exclusive access.
        let recorder = StatsRecorder::new();
        let shared = &recorder;
        shared.record_hit();
        shared.record_hit();
        shared.record_miss();

        let stats = shared.snapshot(2);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 2);
    }
}
