//! Storefront Cache - an in-process cache for async data-fetching functions
//!
//! Wraps producer functions with TTL expiry, tag-based bulk invalidation and
//! single-flight deduplication of concurrent identical calls.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheEntry, CacheKey, CacheOptions, CacheStats, CachedFn};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweeper_task;
