//! Cache configuration and the on-miss loader capability.
//!
//! [`CacheConfig`] is an immutable bundle of validated parameters; the only
//! way to obtain one is through [`CacheConfig::builder`], whose
//! [`build`](CacheConfigBuilder::build) rejects out-of-domain values with a
//! [`ConfigError`]. A cache constructed from a `CacheConfig` therefore never
//! re-validates.
//!
//! | Field | Valid domain | Default |
//! |---|---|---|
//! | `capacity` | ≥ 1 | 1024 |
//! | `ttl` | > 0 | 300 s |
//! | `cleanup_interval` | > 0 | 60 s |
//! | `record_stats` | any | `true` |
//! | `loader` | present or absent | absent |
//!
//! The loader is a value-level capability, not a trait: any
//! `Fn(&K) -> Result<Option<V>, CacheLoadError>` closure. Returning
//! `Ok(None)` means "no value for this key" (a successful load with nothing
//! to insert); returning `Err` records a load failure.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CacheLoadError, ConfigError};

/// On-miss value loader: called with the missing key, outside all cache locks.
pub type CacheLoader<K, V> =
    Arc<dyn Fn(&K) -> Result<Option<V>, CacheLoadError> + Send + Sync>;

const DEFAULT_CAPACITY: usize = 1024;
const DEFAULT_TTL: Duration = Duration::from_secs(300);
const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Validated, immutable cache configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use lrukit::config::CacheConfig;
///
/// let config = CacheConfig::<u64, String>::builder()
///     .capacity(500)
///     .ttl(Duration::from_secs(30))
///     .cleanup_interval(Duration::from_secs(5))
///     .record_stats(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.capacity(), 500);
/// assert_eq!(config.ttl(), Duration::from_secs(30));
/// ```
pub struct CacheConfig<K, V> {
    capacity: usize,
    ttl: Duration,
    cleanup_interval: Duration,
    record_stats: bool,
    loader: Option<CacheLoader<K, V>>,
}

impl<K, V> CacheConfig<K, V> {
    /// Starts a builder with the default parameters.
    pub fn builder() -> CacheConfigBuilder<K, V> {
        CacheConfigBuilder::new()
    }

    /// Maximum number of live entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Uniform time-to-live applied at insertion.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Background sweep period.
    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    /// Whether the cache records statistics.
    pub fn record_stats(&self) -> bool {
        self.record_stats
    }

    /// Returns `true` if an on-miss loader is configured.
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (usize, Duration, Duration, bool, Option<CacheLoader<K, V>>) {
        (
            self.capacity,
            self.ttl,
            self.cleanup_interval,
            self.record_stats,
            self.loader,
        )
    }
}

impl<K, V> fmt::Debug for CacheConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("cleanup_interval", &self.cleanup_interval)
            .field("record_stats", &self.record_stats)
            .field("loader", &self.loader.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Fluent builder for [`CacheConfig`].
///
/// # Example
///
/// ```
/// use lrukit::config::CacheConfig;
/// use lrukit::error::ConfigError;
///
/// // Zero capacity is rejected at build time
/// let err = CacheConfig::<u64, u64>::builder().capacity(0).build().unwrap_err();
/// assert_eq!(err, ConfigError::ZeroCapacity);
/// ```
pub struct CacheConfigBuilder<K, V> {
    capacity: usize,
    ttl: Duration,
    cleanup_interval: Duration,
    record_stats: bool,
    loader: Option<CacheLoader<K, V>>,
}

impl<K, V> CacheConfigBuilder<K, V> {
    fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            record_stats: true,
            loader: None,
        }
    }

    /// Sets the maximum number of live entries (must be ≥ 1).
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the per-entry time-to-live (must be non-zero).
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the background sweep period (must be non-zero).
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Enables or disables statistics recording.
    pub fn record_stats(mut self, record: bool) -> Self {
        self.record_stats = record;
        self
    }

    /// Installs an on-miss loader.
    pub fn loader<F>(mut self, loader: F) -> Self
    where
        F: Fn(&K) -> Result<Option<V>, CacheLoadError> + Send + Sync + 'static,
    {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Validates the parameters and produces an immutable [`CacheConfig`].
    pub fn build(self) -> Result<CacheConfig<K, V>, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.ttl.is_zero() {
            return Err(ConfigError::ZeroTtl);
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::ZeroCleanupInterval);
        }
        Ok(CacheConfig {
            capacity: self.capacity,
            ttl: self.ttl,
            cleanup_interval: self.cleanup_interval,
            record_stats: self.record_stats,
            loader: self.loader,
        })
    }
}

impl<K, V> Default for CacheConfigBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_successfully() {
        let config = CacheConfig::<u64, u64>::builder().build().unwrap();
        assert_eq!(config.capacity(), DEFAULT_CAPACITY);
        assert_eq!(config.ttl(), DEFAULT_TTL);
        assert_eq!(config.cleanup_interval(), DEFAULT_CLEANUP_INTERVAL);
        assert!(config.record_stats());
        assert!(!config.has_loader());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = CacheConfig::<u64, u64>::builder()
            .capacity(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroCapacity);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = CacheConfig::<u64, u64>::builder()
            .ttl(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroTtl);
    }

    #[test]
    fn zero_cleanup_interval_is_rejected() {
        let err = CacheConfig::<u64, u64>::builder()
            .cleanup_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroCleanupInterval);
    }

    #[test]
    fn first_invalid_field_wins() {
        // capacity is checked before ttl, so an all-zero builder reports it.
        let err = CacheConfig::<u64, u64>::builder()
            .capacity(0)
            .ttl(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "capacity");
    }

    #[test]
    fn loader_is_carried_through() {
        let config = CacheConfig::<u64, String>::builder()
            .loader(|key| Ok(Some(format!("loaded-{key}"))))
            .build()
            .unwrap();
        assert!(config.has_loader());

        let (_, _, _, _, loader) = config.into_parts();
        let loaded = loader.unwrap()(&7).unwrap();
        assert_eq!(loaded.as_deref(), Some("loaded-7"));
    }

    #[test]
    fn debug_does_not_require_loader_debug() {
        let config = CacheConfig::<u64, u64>::builder()
            .loader(|_| Ok(None))
            .build()
            .unwrap();
        let rendered = format!("{config:?}");
        assert!(rendered.contains("capacity"));
    }
}
