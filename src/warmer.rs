//! Bulk cache pre-loader.
//!
//! [`CacheWarmer`] loads a list of keys through a loader on a
//! bounded-concurrency pool of scoped worker threads and `put`s every
//! success into a [`TtlLruCache`]. Workers pull key indices from a shared
//! atomic cursor, so the pool is naturally balanced: no key is loaded twice
//! and no worker idles while keys remain.
//!
//! ```text
//!   keys: [k0, k1, k2, k3, k4, ...]
//!            ▲ cursor (fetch_add)
//!   ┌────────┴───────┬────────────────┐
//!   │ worker 0       │ worker 1       │ ... up to `concurrency`
//!   │ load → put     │ load → put     │
//!   └────────────────┴────────────────┘
//! ```
//!
//! A key whose load fails counts as a failure; a key whose loader returns
//! no value is counted in the total only (nothing was inserted, nothing
//! failed).

use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use tracing::debug;

use crate::cache::TtlLruCache;
use crate::config::CacheLoader;
use crate::error::{CacheLoadError, ConfigError};

const DEFAULT_CONCURRENCY: usize = 4;

/// Outcome of a warming run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WarmingResult {
    /// Keys loaded and inserted.
    pub success_count: usize,
    /// Keys whose load failed.
    pub fail_count: usize,
    /// Keys attempted.
    pub total_count: usize,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u64,
}

/// Parallel bulk pre-loader over a cache's public contract.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use lrukit::cache::TtlLruCache;
/// use lrukit::config::CacheConfig;
/// use lrukit::warmer::CacheWarmer;
///
/// let cache = TtlLruCache::new(
///     CacheConfig::<u64, String>::builder()
///         .capacity(100)
///         .ttl(Duration::from_secs(60))
///         .build()
///         .unwrap(),
/// );
///
/// let warmer = CacheWarmer::builder()
///     .concurrency(2)
///     .loader(|key: &u64| Ok(Some(format!("loaded-{key}"))))
///     .build()
///     .unwrap();
///
/// let result = warmer.warm(&cache, &[1, 2, 3]);
/// assert_eq!(result.success_count, 3);
/// assert_eq!(result.fail_count, 0);
/// assert_eq!(*cache.get(&2).unwrap(), "loaded-2");
/// cache.shutdown();
/// ```
pub struct CacheWarmer<K, V> {
    loader: CacheLoader<K, V>,
    concurrency: usize,
}

impl<K, V> std::fmt::Debug for CacheWarmer<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheWarmer")
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl<K, V> CacheWarmer<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Starts a builder with the default concurrency.
    pub fn builder() -> CacheWarmerBuilder<K, V> {
        CacheWarmerBuilder::new()
    }

    /// Returns the worker pool size.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Loads every key and inserts the successes into `cache`.
    ///
    /// An empty key list returns an all-zero result without spawning any
    /// workers.
    pub fn warm(&self, cache: &TtlLruCache<K, V>, keys: &[K]) -> WarmingResult {
        if keys.is_empty() {
            return WarmingResult::default();
        }

        let started = Instant::now();
        let cursor = AtomicUsize::new(0);
        let successes = AtomicUsize::new(0);
        let failures = AtomicUsize::new(0);
        let workers = self.concurrency.min(keys.len());

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let i = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(key) = keys.get(i) else {
                        break;
                    };
                    match (self.loader)(key) {
                        Ok(Some(value)) => {
                            cache.put(key.clone(), value);
                            successes.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(None) => {}
                        Err(err) => {
                            failures.fetch_add(1, Ordering::Relaxed);
                            debug!(error = %err, "warming load failed");
                        }
                    }
                });
            }
        });

        WarmingResult {
            success_count: successes.into_inner(),
            fail_count: failures.into_inner(),
            total_count: keys.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Fluent builder for [`CacheWarmer`].
///
/// Rejects a missing loader and a zero concurrency at build time.
pub struct CacheWarmerBuilder<K, V> {
    loader: Option<CacheLoader<K, V>>,
    concurrency: usize,
}

impl<K, V> CacheWarmerBuilder<K, V> {
    fn new() -> Self {
        Self {
            loader: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets the loader used for every key (required).
    pub fn loader<F>(mut self, loader: F) -> Self
    where
        F: Fn(&K) -> Result<Option<V>, CacheLoadError> + Send + Sync + 'static,
    {
        self.loader = Some(std::sync::Arc::new(loader));
        self
    }

    /// Sets the worker pool size (must be ≥ 1).
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Validates the parameters and produces a [`CacheWarmer`].
    pub fn build(self) -> Result<CacheWarmer<K, V>, ConfigError> {
        let loader = self.loader.ok_or(ConfigError::MissingLoader)?;
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(CacheWarmer {
            loader,
            concurrency: self.concurrency,
        })
    }
}

impl<K, V> Default for CacheWarmerBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
