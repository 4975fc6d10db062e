//! # Concurrent TTL-aware LRU cache engine
//!
//! [`TtlLruCache`] maps keys to values under a capacity bound, evicting the
//! least recently used entry when full and lazily expiring entries whose
//! time-to-live has elapsed. A background sweeper removes expired entries
//! eagerly between accesses, and an optional loader fills misses.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────┐
//!   │                        TtlLruCache<K, V>                        │
//!   │                                                                 │
//!   │   ┌───────────────────────────────────────────────────────────┐ │
//!   │   │                  Arc<CacheShared<K, V>>                   │ │
//!   │   │                                                           │ │
//!   │   │   RwLock<CacheCore> ──┬── FxHashMap<K, NodeId>  (index)   │ │
//!   │   │                       └── RecencyList<Entry>    (order)   │ │
//!   │   │                                                           │ │
//!   │   │   CacheStats (relaxed atomics, lock-independent)          │ │
//!   │   │   Option<CacheLoader>  (called outside all locks)         │ │
//!   │   │   sweeper handle       (stopped + joined on shutdown)     │ │
//!   │   └───────────────────────────────────────────────────────────┘ │
//!   │              ▲                                                  │
//!   │              │ Weak                                             │
//!   │      "lrukit-sweeper" thread, wakes every cleanup_interval      │
//!   └─────────────────────────────────────────────────────────────────┘
//!
//!   head ──► [MRU] ◄──► ... ◄──► [LRU] ◄── tail
//! ```
//!
//! ## Lock discipline
//!
//! | Operation | Lock | Notes |
//! |---|---|---|
//! | `get` (hit already at MRU) | Read | no list mutation needed |
//! | `get` (hit needing promotion) | Read, then Write | re-verified after reacquire |
//! | `get` (expired / miss) | Read, then Write | removal re-verified; loader runs unlocked |
//! | `put` / `put_arc` | Write | overwrite never evicts |
//! | `remove` / `clear` | Write | |
//! | `contains_key` / `len` / `keys` | Read | `contains_key` never promotes |
//! | sweeper pass | Read (scan), Write (double-checked removal) | |
//!
//! The read-to-write upgrade is a release-and-reacquire: another thread may
//! remove or overwrite the entry in the gap, so every write-locked path
//! re-fetches the entry before touching it. List links and the index key set
//! are only ever mutated under the write lock.
//!
//! ## Entry lifecycle
//!
//! Absent → Live (`put`, loader insertion) → Live (overwrite refreshes
//! `created_at`; promotion reorders only) → Removed (`remove`, eviction,
//! `clear`, lazy expiry on access, or sweep). An entry is present in the
//! index and the recency list together, or in neither.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::{CacheConfig, CacheLoader};
use crate::ds::{NodeId, RecencyList};
use crate::stats::CacheStats;
use crate::sweeper::SweeperHandle;

/// Live cache entry: the recency list owns it, the index points at it.
struct Entry<K, V> {
    key: K,
    value: Arc<V>,
    created_at: Instant,
}

impl<K, V> Entry<K, V> {
    #[inline]
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// Index + recency list, guarded together by the engine's `RwLock`.
struct CacheCore<K, V> {
    index: FxHashMap<K, NodeId>,
    list: RecencyList<Entry<K, V>>,
}

/// State shared between cache handles and the sweeper thread.
pub(crate) struct CacheShared<K, V> {
    core: RwLock<CacheCore<K, V>>,
    stats: CacheStats,
    capacity: usize,
    ttl: Duration,
    loader: Option<CacheLoader<K, V>>,
    sweeper: Mutex<Option<SweeperHandle>>,
}

/// Outcome of the read-locked probe in `get`.
enum Probe<V> {
    Hit(Arc<V>),
    Miss,
    Reorder,
}

/// Outcome of the write-locked re-verification in `get`.
enum Verdict<V> {
    Hit(Arc<V>),
    Expired,
    Missing,
}

/// Thread-safe LRU cache with per-entry TTL expiry and optional loading.
///
/// Handles are cheap to clone and share one underlying cache. Values are
/// stored as `Arc<V>`, so `get` hands out shared references without cloning
/// the payload.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use lrukit::cache::TtlLruCache;
/// use lrukit::config::CacheConfig;
///
/// let cache = TtlLruCache::new(
///     CacheConfig::<u64, String>::builder()
///         .capacity(2)
///         .ttl(Duration::from_secs(60))
///         .build()
///         .unwrap(),
/// );
///
/// cache.put(1, "one".to_string());
/// cache.put(2, "two".to_string());
/// assert_eq!(*cache.get(&1).unwrap(), "one");
///
/// // Key 1 was just used, so inserting a third entry evicts key 2
/// cache.put(3, "three".to_string());
/// assert!(cache.contains_key(&1));
/// assert!(!cache.contains_key(&2));
///
/// cache.shutdown();
/// ```
pub struct TtlLruCache<K, V> {
    shared: Arc<CacheShared<K, V>>,
}

impl<K, V> Clone for TtlLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> TtlLruCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Creates a cache from a validated configuration and starts its sweeper.
    pub fn new(config: CacheConfig<K, V>) -> Self {
        let (capacity, ttl, cleanup_interval, record_stats, loader) = config.into_parts();
        let shared = Arc::new(CacheShared {
            core: RwLock::new(CacheCore {
                index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
                list: RecencyList::with_capacity(capacity),
            }),
            stats: if record_stats {
                CacheStats::new()
            } else {
                CacheStats::disabled()
            },
            capacity,
            ttl,
            loader,
            sweeper: Mutex::new(None),
        });
        let handle = SweeperHandle::spawn(Arc::downgrade(&shared), cleanup_interval);
        *shared.sweeper.lock() = Some(handle);
        TtlLruCache { shared }
    }

    /// Looks up `key`, promoting the entry to most-recently-used on a hit.
    ///
    /// An expired entry is removed and treated as a miss. On a miss with a
    /// configured loader, the loader runs outside all locks; a loaded value
    /// is inserted through the normal write path and returned.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use lrukit::cache::TtlLruCache;
    /// use lrukit::config::CacheConfig;
    ///
    /// let cache = TtlLruCache::new(
    ///     CacheConfig::<u64, String>::builder()
    ///         .capacity(10)
    ///         .ttl(Duration::from_secs(60))
    ///         .build()
    ///         .unwrap(),
    /// );
    ///
    /// cache.put(1, "value".to_string());
    /// assert_eq!(*cache.get(&1).unwrap(), "value");
    /// assert!(cache.get(&999).is_none());
    /// cache.shutdown();
    /// ```
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let now = Instant::now();
        // Fast path: a fresh entry already at the MRU position needs no list
        // mutation, so the hit is served entirely under the read lock.
        let probe = {
            let core = self.shared.core.read();
            match core.index.get(key).copied() {
                None => Probe::Miss,
                Some(id) => match core.list.get(id) {
                    None => Probe::Miss,
                    Some(entry) => {
                        if !entry.is_expired(self.shared.ttl, now) && core.list.is_front(id) {
                            Probe::Hit(Arc::clone(&entry.value))
                        } else {
                            Probe::Reorder
                        }
                    }
                },
            }
        };
        match probe {
            Probe::Hit(value) => {
                self.shared.stats.record_hit();
                Some(value)
            }
            Probe::Miss => {
                self.shared.stats.record_miss();
                self.load_through(key)
            }
            Probe::Reorder => self.get_locked(key),
        }
    }

    /// Write-locked tail of `get`: the probe saw an entry that needs
    /// promotion or expiry. The read lock was released in between, so the
    /// entry is re-fetched and re-judged here before anything is touched.
    fn get_locked(&self, key: &K) -> Option<Arc<V>> {
        let now = Instant::now();
        let verdict = {
            let mut core = self.shared.core.write();
            let found = core.index.get(key).copied().and_then(|id| {
                core.list
                    .get(id)
                    .map(|e| (id, e.is_expired(self.shared.ttl, now), Arc::clone(&e.value)))
            });
            match found {
                None => Verdict::Missing,
                Some((id, true, _)) => {
                    core.index.remove(key);
                    core.list.remove(id);
                    Verdict::Expired
                }
                Some((id, false, value)) => {
                    core.list.move_to_front(id);
                    Verdict::Hit(value)
                }
            }
        };
        match verdict {
            Verdict::Hit(value) => {
                self.shared.stats.record_hit();
                Some(value)
            }
            Verdict::Expired => {
                self.shared.stats.record_expired();
                self.shared.stats.record_miss();
                self.load_through(key)
            }
            Verdict::Missing => {
                self.shared.stats.record_miss();
                self.load_through(key)
            }
        }
    }

    /// Runs the configured loader for a key that just missed. The miss has
    /// already been recorded; this records only load outcomes.
    fn load_through(&self, key: &K) -> Option<Arc<V>> {
        let loader = self.shared.loader.as_ref()?;
        match loader(key) {
            Ok(Some(value)) => {
                self.shared.stats.record_load();
                let value = Arc::new(value);
                self.put_arc(key.clone(), Arc::clone(&value));
                Some(value)
            }
            Ok(None) => {
                // A load that produced nothing is still a load; nothing is
                // inserted and the caller sees a plain miss.
                self.shared.stats.record_load();
                None
            }
            Err(err) => {
                self.shared.stats.record_load_fail();
                debug!(error = %err, "cache loader failed");
                None
            }
        }
    }

    /// Inserts or overwrites an entry, wrapping the value in an `Arc`.
    ///
    /// An overwrite replaces the value in place, refreshes its TTL clock and
    /// promotes the entry; it never evicts. A fresh insertion at capacity
    /// evicts the least recently used entry first.
    pub fn put(&self, key: K, value: V) {
        self.put_arc(key, Arc::new(value));
    }

    /// Inserts a pre-wrapped `Arc<V>` directly (no re-allocation when the
    /// value is already shared).
    pub fn put_arc(&self, key: K, value: Arc<V>) {
        let now = Instant::now();
        let mut core = self.shared.core.write();
        self.shared.stats.record_put();

        if let Some(id) = core.index.get(&key).copied() {
            if let Some(entry) = core.list.get_mut(id) {
                entry.value = value;
                entry.created_at = now;
                core.list.move_to_front(id);
                return;
            }
        }

        if core.index.len() >= self.shared.capacity {
            if let Some(victim) = core.list.pop_back() {
                core.index.remove(&victim.key);
                self.shared.stats.record_eviction();
            }
        }

        let id = core.list.push_front(Entry {
            key: key.clone(),
            value,
            created_at: now,
        });
        core.index.insert(key, id);
    }

    /// Removes an entry; returns `true` if it was present.
    pub fn remove(&self, key: &K) -> bool {
        let mut core = self.shared.core.write();
        match core.index.remove(key) {
            Some(id) => {
                core.list.remove(id);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `key` maps to a live, non-expired entry.
    ///
    /// This is a read-through predicate: it never promotes the entry and
    /// records no statistics.
    pub fn contains_key(&self, key: &K) -> bool {
        let now = Instant::now();
        let core = self.shared.core.read();
        core.index
            .get(key)
            .copied()
            .and_then(|id| core.list.get(id))
            .is_some_and(|entry| !entry.is_expired(self.shared.ttl, now))
    }

    /// Returns the current number of entries (expired-but-unswept included).
    pub fn len(&self) -> usize {
        self.shared.core.read().index.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries. Statistics counters are left untouched.
    pub fn clear(&self) {
        let mut core = self.shared.core.write();
        core.index.clear();
        core.list.clear();
    }

    /// Returns a weakly-consistent snapshot of the current keys.
    pub fn keys(&self) -> Vec<K> {
        self.shared.core.read().index.keys().cloned().collect()
    }

    /// Returns a handle to the live statistics counters.
    pub fn stats(&self) -> &CacheStats {
        &self.shared.stats
    }

    /// Returns the maximum capacity of the cache.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Returns the per-entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    /// Stops the background sweeper and joins it. Idempotent; also invoked
    /// implicitly (without the join) when the last handle is dropped.
    pub fn shutdown(&self) {
        if let Some(handle) = self.shared.sweeper.lock().take() {
            handle.stop_and_join();
            debug!("cache sweeper stopped");
        }
    }
}

impl<K, V> CacheShared<K, V>
where
    K: Eq + Hash + Clone,
{
    /// One sweeper pass: scan for expired entries under the read lock, then
    /// remove them under the write lock with a per-key double-check.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<(K, Instant)> = {
            let core = self.core.read();
            core.list
                .iter()
                .filter(|entry| entry.is_expired(self.ttl, now))
                .map(|entry| (entry.key.clone(), entry.created_at))
                .collect()
        };
        if expired.is_empty() {
            return 0;
        }

        let mut removed = 0;
        let mut core = self.core.write();
        for (key, created_at) in expired {
            let Some(id) = core.index.get(&key).copied() else {
                continue;
            };
            // An unchanged created_at means no overwrite happened since the
            // scan, and an entry expired then is still expired now. A
            // refreshed entry must survive.
            let stale = core
                .list
                .get(id)
                .is_some_and(|entry| entry.created_at == created_at);
            if !stale {
                continue;
            }
            core.index.remove(&key);
            core.list.remove(id);
            self.stats.record_expired();
            removed += 1;
        }
        removed
    }
}

impl<K, V> Drop for CacheShared<K, V> {
    fn drop(&mut self) {
        // Joining here could deadlock if the final handle is dropped on the
        // sweeper thread itself (it briefly upgrades its Weak during a pass),
        // so the thread is only signalled and left to exit on its own.
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.request_stop();
        }
    }
}

impl<K, V> fmt::Debug for TtlLruCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlLruCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("ttl", &self.ttl())
            .finish_non_exhaustive()
    }
}
