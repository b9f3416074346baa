//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// The enum is `Clone` because a single-flight outcome (including a failure)
/// is broadcast to every caller that joined the in-flight execution.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Producer arguments could not be canonicalized into a cache key
    #[error("Key encoding failed: {0}")]
    KeyEncoding(String),

    /// The wrapped producer function failed; never cached
    #[error("Producer failed: {0}")]
    Producer(Arc<anyhow::Error>),

    /// Internal invariant violation (e.g. cached value type mismatch)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps a producer failure so it can be shared with all joined waiters.
    pub fn producer(err: anyhow::Error) -> Self {
        CacheError::Producer(Arc::new(err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
