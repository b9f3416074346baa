//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and tag support.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::cache::CacheKey;

/// The opaque producer result, stored by value behind a shared pointer and
/// downcast back to its concrete type at the facade boundary.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

// == Entry State ==
/// Derived lifecycle state of an entry.
///
/// Invalidated entries are purged eagerly and are therefore never observable,
/// so no `Invalidated` variant is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// TTL has not elapsed (or the entry never expires)
    Fresh,
    /// TTL has elapsed; the entry will be replaced on the next access
    Stale,
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Clone)]
pub struct CacheEntry {
    /// Canonical key identifying this entry
    pub key: CacheKey,
    /// The stored producer result
    pub value: CachedValue,
    /// Wall-clock creation timestamp
    pub created_at: DateTime<Utc>,
    /// Monotonic storage instant used for expiry arithmetic
    pub stored_at: Instant,
    /// Time-to-live, None = never expires
    pub ttl: Option<Duration>,
    /// Invalidation labels attached to this entry
    pub tags: HashSet<String>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL and tags.
    pub fn new(
        key: CacheKey,
        value: CachedValue,
        ttl: Option<Duration>,
        tags: HashSet<String>,
    ) -> Self {
        Self {
            key,
            value,
            created_at: Utc::now(),
            stored_at: Instant::now(),
            ttl,
            tags,
        }
    }

    // == Expiration ==
    /// Returns the instant at which this entry expires, or None if it never
    /// expires (no TTL, or the TTL overflows instant arithmetic).
    pub fn expires_at(&self) -> Option<Instant> {
        self.ttl.and_then(|ttl| self.stored_at.checked_add(ttl))
    }

    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is considered expired when the current
    /// time is greater than or equal to the expiration time, so a call made
    /// exactly when the TTL elapses recomputes.
    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(expires) => Instant::now() >= expires,
            None => false,
        }
    }

    /// Returns true while the TTL has not elapsed.
    pub fn is_fresh(&self) -> bool {
        !self.is_expired()
    }

    /// Returns the derived lifecycle state.
    pub fn state(&self) -> EntryState {
        if self.is_expired() {
            EntryState::Stale
        } else {
            EntryState::Fresh
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at()
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The value is an opaque Any; show the metadata only.
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("created_at", &self.created_at)
            .field("ttl", &self.ttl)
            .field("tags", &self.tags)
            .field("state", &self.state())
            .finish()
    }
}
