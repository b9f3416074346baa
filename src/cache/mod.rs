//! Cache Module
//!
//! Provides in-process caching with TTL expiry, tag invalidation and
//! single-flight deduplication of concurrent producer executions.

mod entry;
mod facade;
mod flight;
pub mod key;
mod stats;
mod store;
mod tags;


// Re-export public types
pub use entry::{CacheEntry, CachedValue, EntryState};
pub use facade::{Cache, CacheOptions, CachedFn};
pub use flight::SingleFlight;
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::EntryStore;
pub use tags::TagIndex;

// == Public Constants ==
/// Maximum allowed encoded key length in bytes
pub const MAX_KEY_LENGTH: usize = 4096;
