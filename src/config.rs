//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Fallback TTL applied when a wrapped function sets no revalidate period.
    /// `None` means entries without an explicit TTL never expire.
    pub default_ttl: Option<Duration>,
    /// Background sweeper interval
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_SECS` - Fallback TTL in seconds (default: unset, never expires)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweeper frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(60)),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: None,
            sweep_interval: Duration::from_secs(60),
        }
    }
}
