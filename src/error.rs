//! Error types for the lrukit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache or warmer configuration parameters
//!   are out of domain. One variant per rejectable parameter, so callers can
//!   match on exactly what was wrong instead of parsing a message.
//! - [`CacheLoadError`]: Raised by a cache loader when it cannot produce a
//!   value for a key. The cache absorbs it into a miss and a load-failure
//!   counter increment; it is never propagated to `get` callers.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//! use lrukit::config::CacheConfig;
//! use lrukit::error::ConfigError;
//!
//! let config = CacheConfig::<u64, String>::builder()
//!     .capacity(100)
//!     .ttl(Duration::from_secs(60))
//!     .build();
//! assert!(config.is_ok());
//!
//! // A zero capacity is caught at build time, as a typed variant
//! let bad = CacheConfig::<u64, String>::builder().capacity(0).build();
//! assert_eq!(bad.unwrap_err(), ConfigError::ZeroCapacity);
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Rejected configuration parameter, from
/// [`CacheConfigBuilder::build`](crate::config::CacheConfigBuilder::build) or
/// [`CacheWarmerBuilder::build`](crate::warmer::CacheWarmerBuilder::build).
///
/// Every variant names one parameter of the cache or warmer surface whose
/// value cannot produce a working instance. [`field`](ConfigError::field)
/// gives the parameter name for log keys; `Display` renders the constraint
/// that was violated.
///
/// # Example
///
/// ```
/// use lrukit::config::CacheConfig;
/// use lrukit::error::ConfigError;
///
/// let err = CacheConfig::<u64, u64>::builder().capacity(0).build().unwrap_err();
/// assert_eq!(err, ConfigError::ZeroCapacity);
/// assert_eq!(err.field(), "capacity");
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `capacity` was zero; the cache must admit at least one entry.
    ZeroCapacity,
    /// `ttl` was zero; every entry would be born expired.
    ZeroTtl,
    /// `cleanup_interval` was zero; the sweeper would spin.
    ZeroCleanupInterval,
    /// The warmer was built without a loader.
    MissingLoader,
    /// Warmer `concurrency` was zero; no worker could run.
    ZeroConcurrency,
}

impl ConfigError {
    /// Returns the name of the rejected configuration field.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::ZeroCapacity => "capacity",
            ConfigError::ZeroTtl => "ttl",
            ConfigError::ZeroCleanupInterval => "cleanup_interval",
            ConfigError::MissingLoader => "loader",
            ConfigError::ZeroConcurrency => "concurrency",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => f.write_str("capacity must be at least 1"),
            ConfigError::ZeroTtl => f.write_str("ttl must be positive"),
            ConfigError::ZeroCleanupInterval => {
                f.write_str("cleanup interval must be positive")
            }
            ConfigError::MissingLoader => f.write_str("warmer requires a loader"),
            ConfigError::ZeroConcurrency => f.write_str("concurrency must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// CacheLoadError
// ---------------------------------------------------------------------------

/// Error raised by a cache loader when it fails to produce a value.
///
/// Carries the failing key (rendered to a string by the loader author) and a
/// reason. The cache converts it into a `None` result plus a load-failure
/// counter increment, so a flaky backing store never poisons cache callers.
///
/// # Example
///
/// ```
/// use lrukit::error::CacheLoadError;
///
/// let err = CacheLoadError::new("user:42", "backend unavailable");
/// assert_eq!(err.key(), "user:42");
/// assert!(err.to_string().contains("backend unavailable"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLoadError {
    key: String,
    reason: String,
}

impl CacheLoadError {
    /// Creates a new `CacheLoadError` for the given key and reason.
    #[inline]
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the key the loader failed on.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the failure reason.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for CacheLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load key `{}`: {}", self.key, self.reason)
    }
}

impl std::error::Error for CacheLoadError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CONFIG_ERRORS: [ConfigError; 5] = [
        ConfigError::ZeroCapacity,
        ConfigError::ZeroTtl,
        ConfigError::ZeroCleanupInterval,
        ConfigError::MissingLoader,
        ConfigError::ZeroConcurrency,
    ];

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn every_variant_mentions_its_field() {
        // The field name doubles as a log key, so the rendered message must
        // let a reader find the field without consulting field().
        for err in ALL_CONFIG_ERRORS {
            let message = err.to_string();
            let field_words = err.field().replace('_', " ");
            assert!(
                message.contains(err.field()) || message.contains(&field_words),
                "`{message}` does not mention `{}`",
                err.field()
            );
        }
    }

    #[test]
    fn fields_are_distinct_across_variants() {
        for (i, a) in ALL_CONFIG_ERRORS.iter().enumerate() {
            for b in &ALL_CONFIG_ERRORS[i + 1..] {
                assert_ne!(a.field(), b.field());
                assert_ne!(a.to_string(), b.to_string());
            }
        }
    }

    #[test]
    fn variants_compare_by_identity() {
        assert_eq!(ConfigError::ZeroTtl, ConfigError::ZeroTtl);
        assert_ne!(ConfigError::ZeroTtl, ConfigError::ZeroCapacity);
    }

    #[test]
    fn config_error_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ConfigError::MissingLoader);
        assert!(err.to_string().contains("loader"));
    }

    // -- CacheLoadError ---------------------------------------------------

    #[test]
    fn load_error_display_names_key_and_reason() {
        let err = CacheLoadError::new("k1", "DB unavailable");
        assert_eq!(err.to_string(), "failed to load key `k1`: DB unavailable");
    }

    #[test]
    fn load_error_accessors() {
        let err = CacheLoadError::new("k1", "timeout");
        assert_eq!(err.key(), "k1");
        assert_eq!(err.reason(), "timeout");
    }

    #[test]
    fn load_error_round_trips_through_dyn_error() {
        let err: Box<dyn std::error::Error> = Box::new(CacheLoadError::new("k", "r"));
        assert!(err.to_string().contains('k'));
    }
}
