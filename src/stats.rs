//! Cache statistics: monotonic event counters and derived rates.
//!
//! [`CacheStats`] holds seven independent `AtomicU64` counters that are safe
//! to bump from any thread without external locking. The counters are
//! deliberately not kept mutually consistent: each increment is its own
//! relaxed atomic operation, independent of the cache lock, so values read
//! while traffic is in flight may briefly disagree with one another.
//!
//! [`CacheStats::snapshot`] produces a [`CacheStatsSnapshot`], a plain value
//! copy that is invariant under further counter activity.
//!
//! | Counter | Bumped on |
//! |---|---|
//! | hits | `get` served from a live entry |
//! | misses | `get` that found nothing usable (absent or expired) |
//! | evictions | LRU displacement during `put` |
//! | loads | loader invocation that returned (even with no value) |
//! | load_failures | loader invocation that failed |
//! | expirations | entry removed because its TTL elapsed |
//! | puts | every insertion or overwrite |

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe monotonic counters for cache events.
///
/// Constructed enabled by [`new`](CacheStats::new) or inert by
/// [`disabled`](CacheStats::disabled); a disabled instance turns every
/// `record_*` call into a no-op and reads zero everywhere.
///
/// # Example
///
/// ```
/// use lrukit::stats::CacheStats;
///
/// let stats = CacheStats::new();
/// stats.record_hit();
/// stats.record_hit();
/// stats.record_miss();
///
/// assert_eq!(stats.hit_count(), 2);
/// assert_eq!(stats.total_request_count(), 3);
/// assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct CacheStats {
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    expirations: AtomicU64,
    puts: AtomicU64,
}

impl CacheStats {
    /// Creates a new, enabled counter set with all counters at zero.
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    /// Creates a counter set whose `record_*` methods are no-ops.
    pub fn disabled() -> Self {
        Self::with_enabled(false)
    }

    fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            load_failures: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            puts: AtomicU64::new(0),
        }
    }

    /// Returns `true` if this instance records events.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    fn bump(&self, counter: &AtomicU64) {
        if self.enabled {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a cache hit.
    #[inline]
    pub fn record_hit(&self) {
        self.bump(&self.hits);
    }

    /// Records a cache miss.
    #[inline]
    pub fn record_miss(&self) {
        self.bump(&self.misses);
    }

    /// Records an LRU eviction.
    #[inline]
    pub fn record_eviction(&self) {
        self.bump(&self.evictions);
    }

    /// Records a loader invocation that returned (with or without a value).
    #[inline]
    pub fn record_load(&self) {
        self.bump(&self.loads);
    }

    /// Records a loader invocation that failed.
    #[inline]
    pub fn record_load_fail(&self) {
        self.bump(&self.load_failures);
    }

    /// Records an entry removed because its TTL elapsed.
    #[inline]
    pub fn record_expired(&self) {
        self.bump(&self.expirations);
    }

    /// Records an insertion or overwrite.
    #[inline]
    pub fn record_put(&self) {
        self.bump(&self.puts);
    }

    /// Returns the number of recorded hits.
    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of recorded misses.
    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Returns the number of recorded LRU evictions.
    pub fn eviction_count(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Returns the number of recorded loader invocations.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Returns the number of recorded loader failures.
    pub fn load_fail_count(&self) -> u64 {
        self.load_failures.load(Ordering::Relaxed)
    }

    /// Returns the number of recorded TTL expirations.
    pub fn expired_count(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    /// Returns the number of recorded puts.
    pub fn put_count(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    /// Returns hits + misses.
    pub fn total_request_count(&self) -> u64 {
        self.hit_count() + self.miss_count()
    }

    /// Returns hits / (hits + misses), or 0.0 when no requests were recorded.
    pub fn hit_rate(&self) -> f64 {
        rate(self.hit_count(), self.miss_count())
    }

    /// Returns misses / (hits + misses), or 0.0 when no requests were recorded.
    pub fn miss_rate(&self) -> f64 {
        rate(self.miss_count(), self.hit_count())
    }

    /// Returns every counter to zero.
    ///
    /// Each counter is reset individually; concurrent increments landing
    /// mid-reset may survive into the post-reset values.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.loads.store(0, Ordering::Relaxed);
        self.load_failures.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
        self.puts.store(0, Ordering::Relaxed);
    }

    /// Captures a point-in-time value copy of all counters.
    ///
    /// Each counter is read independently; the snapshot is not a cross-counter
    /// consistent cut, but it never changes after being taken.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::stats::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_hit();
    ///
    /// let snap = stats.snapshot();
    /// stats.record_hit();
    ///
    /// assert_eq!(snap.hits, 1);
    /// assert_eq!(stats.hit_count(), 2);
    /// ```
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hit_count(),
            misses: self.miss_count(),
            evictions: self.eviction_count(),
            loads: self.load_count(),
            load_failures: self.load_fail_count(),
            expirations: self.expired_count(),
            puts: self.put_count(),
        }
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

fn rate(numerator: u64, complement: u64) -> f64 {
    let total = numerator + complement;
    if total == 0 {
        0.0
    } else {
        numerator as f64 / total as f64
    }
}

/// Immutable point-in-time copy of [`CacheStats`] counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub loads: u64,
    pub load_failures: u64,
    pub expirations: u64,
    pub puts: u64,
}

impl CacheStatsSnapshot {
    /// Returns hits + misses at snapshot time.
    pub fn total_request_count(&self) -> u64 {
        self.hits + self.misses
    }

    /// Returns hits / (hits + misses), or 0.0 when no requests were recorded.
    pub fn hit_rate(&self) -> f64 {
        rate(self.hits, self.misses)
    }

    /// Returns misses / (hits + misses), or 0.0 when no requests were recorded.
    pub fn miss_rate(&self) -> f64 {
        rate(self.misses, self.hits)
    }
}

impl fmt::Display for CacheStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} hit_rate={:.2}% miss_rate={:.2}% evictions={} \
             expirations={} loads={} load_failures={} puts={}",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.miss_rate() * 100.0,
            self.evictions,
            self.expirations,
            self.loads,
            self.load_failures,
            self.puts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn initial_stats_are_zero() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_count(), 0);
        assert_eq!(stats.miss_count(), 0);
        assert_eq!(stats.eviction_count(), 0);
        assert_eq!(stats.load_count(), 0);
        assert_eq!(stats.load_fail_count(), 0);
        assert_eq!(stats.expired_count(), 0);
        assert_eq!(stats.put_count(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 0.0);
        assert_eq!(stats.total_request_count(), 0);
    }

    #[test]
    fn record_hit_updates_counts_and_rates() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        assert_eq!(stats.hit_count(), 2);
        assert_eq!(stats.miss_count(), 1);
        assert_eq!(stats.total_request_count(), 3);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert!((stats.miss_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn hit_and_miss_rates_sum_to_one() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_miss();

        assert!((stats.hit_rate() + stats.miss_rate() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn reset_zeroes_all_counters() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();
        stats.record_load();
        stats.record_load_fail();
        stats.record_expired();
        stats.record_put();

        stats.reset();

        assert_eq!(stats.hit_count(), 0);
        assert_eq!(stats.miss_count(), 0);
        assert_eq!(stats.eviction_count(), 0);
        assert_eq!(stats.load_count(), 0);
        assert_eq!(stats.load_fail_count(), 0);
        assert_eq!(stats.expired_count(), 0);
        assert_eq!(stats.put_count(), 0);
    }

    #[test]
    fn snapshot_captures_point_in_time_values() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        let snap = stats.snapshot();
        assert_eq!(snap.hits, 2);
        assert_eq!(snap.misses, 1);

        stats.record_hit();
        stats.record_hit();
        assert_eq!(snap.hits, 2);
        assert_eq!(stats.hit_count(), 4);
    }

    #[test]
    fn snapshot_display_contains_rates() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();

        let rendered = stats.snapshot().to_string();
        assert!(rendered.contains("hit_rate"));
        assert!(rendered.contains("miss_rate"));
    }

    #[test]
    fn disabled_stats_ignore_records() {
        let stats = CacheStats::disabled();
        stats.record_hit();
        stats.record_miss();
        stats.record_put();

        assert!(!stats.is_enabled());
        assert_eq!(stats.hit_count(), 0);
        assert_eq!(stats.miss_count(), 0);
        assert_eq!(stats.put_count(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn concurrent_increments_are_fully_counted() {
        let stats = Arc::new(CacheStats::new());
        let threads = 20u64;
        let ops_each = 1000u64;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..ops_each {
                        stats.record_hit();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.hit_count(), threads * ops_each);
    }
}
