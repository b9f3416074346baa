//! Cache Facade
//!
//! The public entry point: wraps an async producer function with a key
//! specification and an invalidation policy (TTL and/or tags). Calling the
//! wrapped function serves a fresh entry when one exists, otherwise blocks
//! on a (possibly shared) producer execution and stores the result.
//!
//! Staleness is resolved synchronously: a stale or missing entry always
//! waits for a fresh producer run. There is no stale-while-revalidate mode.

use std::collections::HashSet;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::cache::{
    key, CacheEntry, CacheKey, CacheStats, CachedValue, EntryStore, SingleFlight,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Cache Options ==
/// Per-wrap invalidation policy.
///
/// Defaults are explicit: no revalidate period means the entry never
/// expires; no tags means the entry is invalidable only by exact key.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    /// TTL after which a stored result is recomputed on access
    pub revalidate: Option<Duration>,
    /// Invalidation labels attached to stored results
    pub tags: HashSet<String>,
}

impl CacheOptions {
    /// Creates options with no TTL and no tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the revalidate period.
    pub fn with_revalidate(mut self, ttl: Duration) -> Self {
        self.revalidate = Some(ttl);
        self
    }

    /// Sets the revalidate period in whole seconds.
    pub fn with_revalidate_secs(self, secs: u64) -> Self {
        self.with_revalidate(Duration::from_secs(secs))
    }

    /// Attaches a single invalidation tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Attaches several invalidation tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

// == Cache ==
/// Process-wide cache instance shared by reference across all callers.
///
/// Initialized once at process start; no teardown is required beyond process
/// exit (nothing is persisted).
#[derive(Debug)]
pub struct Cache {
    pub(crate) store: RwLock<EntryStore>,
    pub(crate) flight: SingleFlight,
    config: CacheConfig,
}

impl Cache {
    // == Constructor ==
    /// Creates a new cache with the given configuration.
    pub fn new(config: CacheConfig) -> Arc<Self> {
        Arc::new(Self {
            store: RwLock::new(EntryStore::new()),
            flight: SingleFlight::new(),
            config,
        })
    }

    /// Creates a new cache with default configuration.
    pub fn with_defaults() -> Arc<Self> {
        Self::new(CacheConfig::default())
    }

    // == Wrap ==
    /// Wraps `producer` with caching under `key_parts` and `options`.
    ///
    /// The returned [`CachedFn`] is called with the producer's arguments and
    /// yields the producer's result, served from cache when fresh.
    ///
    /// # Example
    /// ```ignore
    /// let latest = cache.wrap(
    ///     |()| async { fetch_latest_products().await },
    ///     &["/", "getLatestProducts"],
    ///     CacheOptions::new().with_revalidate_secs(86_400).with_tag("products"),
    /// );
    /// let products = latest.get().await?;
    /// ```
    pub fn wrap<Args, T, F, Fut>(
        self: &Arc<Self>,
        producer: F,
        key_parts: &[&str],
        options: CacheOptions,
    ) -> CachedFn<Args, T, F>
    where
        Args: Serialize,
        T: Clone + Send + Sync + 'static,
        F: Fn(Args) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        CachedFn {
            cache: Arc::clone(self),
            key_parts: key_parts.iter().map(|p| p.to_string()).collect(),
            options,
            producer,
            _marker: PhantomData,
        }
    }

    // == Invalidate Tag ==
    /// Removes every entry carrying `tag` so the next read recomputes.
    ///
    /// Returns the number of entries removed; an unknown tag is a no-op
    /// returning 0, never an error.
    pub async fn invalidate_tag(&self, tag: &str) -> usize {
        let removed = self.store.write().await.invalidate_tag(tag);
        debug!(tag, removed, "tag invalidated");
        removed
    }

    // == Invalidate Key ==
    /// Removes the entry for an exact key.
    ///
    /// Returns true if an entry was present.
    pub async fn invalidate_key(&self, key: &CacheKey) -> bool {
        let removed = self.store.write().await.remove(key);
        if removed {
            debug!(%key, "key invalidated");
        }
        removed
    }

    // == Introspection ==
    /// Returns the entry for `key`, if any, regardless of freshness.
    pub async fn entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.store.read().await.get(key)
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

// == Cached Function ==
/// A producer function wrapped with caching; call it like the producer.
pub struct CachedFn<Args, T, F> {
    cache: Arc<Cache>,
    key_parts: Vec<String>,
    options: CacheOptions,
    producer: F,
    _marker: PhantomData<fn(Args) -> T>,
}

impl<Args, T, F, Fut> CachedFn<Args, T, F>
where
    Args: Serialize,
    T: Clone + Send + Sync + 'static,
    F: Fn(Args) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    // == Call ==
    /// Invokes the wrapped function.
    ///
    /// A fresh entry is returned immediately with no producer involvement.
    /// Otherwise the call delegates to the single-flight coordinator: one
    /// producer execution runs per key, its result is stored with the
    /// configured TTL and tags, and its outcome (value or failure) is shared
    /// with every concurrent caller. Producer failures are propagated
    /// verbatim and never cached.
    pub async fn call(&self, args: Args) -> Result<T> {
        let key = key::encode(&self.key_parts, &args)?;

        {
            // Fast path under the read lock: fresh hits never contend with
            // each other, and counters are atomic.
            let store = self.cache.store.read().await;
            if let Some(entry) = store.get(&key) {
                if entry.is_fresh() {
                    store.record_hit();
                    trace!(%key, "cache hit");
                    return downcast_value(&entry.value);
                }
            }
            store.record_miss();
            trace!(%key, "cache miss");
        }

        let cache = Arc::clone(&self.cache);
        let flight_key = key.clone();
        let ttl = self.options.revalidate.or(cache.config.default_ttl);
        let tags = self.options.tags.clone();
        // Building the future is lazy; it only runs if this caller leads.
        let producer_fut = (self.producer)(args);

        let value = self
            .cache
            .flight
            .run(&key, move || async move {
                // A racing flight may have stored a fresh entry while this
                // caller waited for leadership.
                if let Some(entry) = cache.store.read().await.get(&flight_key) {
                    if entry.is_fresh() {
                        return Ok(entry.value);
                    }
                }

                match producer_fut.await {
                    Ok(result) => {
                        let value: CachedValue = Arc::new(result);
                        let entry =
                            CacheEntry::new(flight_key, value.clone(), ttl, tags);
                        cache.store.write().await.put(entry);
                        Ok(value)
                    }
                    Err(err) => Err(CacheError::producer(err)),
                }
            })
            .await?;

        downcast_value(&value)
    }

    // == Cache Key ==
    /// Returns the canonical key this wrapper uses for `args`.
    pub fn cache_key(&self, args: &Args) -> Result<CacheKey> {
        key::encode(&self.key_parts, args)
    }

    // == Invalidate ==
    /// Invalidates the entry for `args` by exact key.
    ///
    /// Returns true if an entry was present.
    pub async fn invalidate(&self, args: &Args) -> Result<bool> {
        let key = key::encode(&self.key_parts, args)?;
        Ok(self.cache.invalidate_key(&key).await)
    }
}

impl<T, F, Fut> CachedFn<(), T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(()) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    /// Convenience for zero-argument producers.
    pub async fn get(&self) -> Result<T> {
        self.call(()).await
    }
}

/// Downcasts a shared cached value back to its concrete type.
///
/// A mismatch means two wrapped functions share one key with different
/// result types; surfaced as an internal error, never a wrong value.
fn downcast_value<T: Clone + Send + Sync + 'static>(value: &CachedValue) -> Result<T> {
    value
        .clone()
        .downcast::<T>()
        .map(|typed| typed.as_ref().clone())
        .map_err(|_| {
            CacheError::Internal(
                "cached value type mismatch: two wrapped functions share a key".to_string(),
            )
        })
}
