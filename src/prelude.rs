pub use crate::cache::TtlLruCache;
pub use crate::config::{CacheConfig, CacheConfigBuilder, CacheLoader};
pub use crate::ds::{NodeId, RecencyList};
pub use crate::error::{CacheLoadError, ConfigError};
pub use crate::stats::{CacheStats, CacheStatsSnapshot};
pub use crate::warmer::{CacheWarmer, CacheWarmerBuilder, WarmingResult};
