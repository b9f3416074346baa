//! Entry Store Module
//!
//! Main cache storage combining HashMap entry storage with the tag index and
//! statistics. Freshness policy lives in the facade; the store returns
//! entries regardless of TTL state.
//!
//! The store is guarded by a `tokio::sync::RwLock` at the facade, so every
//! `&mut self` method here is one atomic critical section: a `put` either
//! installs the full entry with consistent tag associations or none of it.

use std::collections::HashMap;

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheKey, CacheStats, TagIndex};

// == Entry Store ==
/// Cache entry storage with tag-index maintenance and TTL sweeping.
#[derive(Debug, Default)]
pub struct EntryStore {
    /// Key-entry storage
    entries: HashMap<CacheKey, CacheEntry>,
    /// Tag-to-keys index, kept bidirectionally consistent with `entries`
    tags: TagIndex,
    /// Performance counters, atomic so the hit path records under a read lock
    stats: StatsRecorder,
}

impl EntryStore {
    // == Constructor ==
    /// Creates an empty EntryStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns a clone of the entry for `key` regardless of freshness.
    ///
    /// The caller evaluates TTL state so stale-serving policy stays outside
    /// the store. Cloning is cheap: the value is behind an `Arc`.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).cloned()
    }

    // == Put ==
    /// Upserts an entry.
    ///
    /// Replaces any existing entry for the same key (replace, not merge):
    /// the old entry's tag associations are removed and the new entry's tags
    /// are registered within the same critical section.
    pub fn put(&mut self, entry: CacheEntry) {
        let key = entry.key.clone();

        if let Some(old) = self.entries.remove(&key) {
            self.tags.remove_key(&key, &old.tags);
        }

        for tag in &entry.tags {
            self.tags.associate(tag, &key);
        }
        self.entries.insert(key, entry);
    }

    // == Remove ==
    /// Deletes the entry for `key` and all its tag associations.
    ///
    /// Returns true if an entry was present.
    pub fn remove(&mut self, key: &CacheKey) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.tags.remove_key(key, &entry.tags);
                self.stats.record_invalidation(1);
                true
            }
            None => false,
        }
    }

    // == Invalidate Tag ==
    /// Removes every entry carrying `tag`, cascading disassociation from all
    /// tags those entries hold.
    ///
    /// Returns the number of entries removed; an unknown tag is a no-op
    /// returning 0.
    pub fn invalidate_tag(&mut self, tag: &str) -> usize {
        let keys = self.tags.take(tag);
        let mut removed = 0;

        for key in &keys {
            if let Some(entry) = self.entries.remove(key) {
                self.tags.remove_key(key, &entry.tags);
                removed += 1;
            }
        }

        self.stats.record_invalidation(removed);
        removed
    }

    // == Sweep Expired ==
    /// Removes all expired entries and their tag associations.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let expired_keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            if let Some(entry) = self.entries.remove(key) {
                self.tags.remove_key(key, &entry.tags);
            }
        }

        let count = expired_keys.len();
        self.stats.record_sweep(count);
        count
    }

    // == Stats ==
    /// Returns a snapshot of current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    /// Records a fresh-entry hit; takes `&self` so the facade can record
    /// through the read lock without serializing other callers.
    pub(crate) fn record_hit(&self) {
        self.stats.record_hit();
    }

    /// Records a miss (absent or stale entry).
    pub(crate) fn record_miss(&self) {
        self.stats.record_miss();
    }

    /// Read access to the tag index, for diagnostics and tests.
    pub fn tag_index(&self) -> &TagIndex {
        &self.tags
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn entry(name: &str, ttl: Option<Duration>, tags: &[&str]) -> CacheEntry {
        let key = key::encode(&[name.to_string()], &()).unwrap();
        let tags: HashSet<String> = tags.iter().map(|t| t.to_string()).collect();
        CacheEntry::new(key, Arc::new(name.to_string()), ttl, tags)
    }

    #[test]
    fn test_store_put_and_get() {
        let mut store = EntryStore::new();
        let e = entry("popular", None, &["products"]);
        let key = e.key.clone();

        store.put(e);

        let fetched = store.get(&key).unwrap();
        assert_eq!(fetched.key, key);
        assert_eq!(store.len(), 1);
        assert!(store.tag_index().keys_for("products").unwrap().contains(&key));
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = EntryStore::new();
        let key = key::encode(&["missing".to_string()], &()).unwrap();
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn test_store_put_replaces_tags() {
        let mut store = EntryStore::new();
        let first = entry("popular", None, &["products", "homepage"]);
        let key = first.key.clone();
        store.put(first);

        // Same key, different tag set: old associations must go away.
        let second = CacheEntry::new(
            key.clone(),
            Arc::new("fresh".to_string()),
            None,
            ["promo".to_string()].into(),
        );
        store.put(second);

        assert_eq!(store.len(), 1);
        assert!(store.tag_index().keys_for("products").is_none());
        assert!(store.tag_index().keys_for("homepage").is_none());
        assert!(store.tag_index().keys_for("promo").unwrap().contains(&key));
    }

    #[test]
    fn test_store_remove() {
        let mut store = EntryStore::new();
        let e = entry("popular", None, &["products"]);
        let key = e.key.clone();
        store.put(e);

        assert!(store.remove(&key));
        assert!(store.is_empty());
        assert!(store.tag_index().is_empty());
        assert!(!store.remove(&key));
    }

    #[test]
    fn test_invalidate_tag_removes_tagged_entries() {
        let mut store = EntryStore::new();
        store.put(entry("popular", None, &["products"]));
        store.put(entry("latest", None, &["products"]));
        store.put(entry("sales", None, &["orders"]));

        let removed = store.invalidate_tag("products");

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.tag_index().keys_for("products").is_none());
        assert!(store.tag_index().keys_for("orders").is_some());
    }

    #[test]
    fn test_invalidate_tag_cascades_other_tags() {
        let mut store = EntryStore::new();
        store.put(entry("popular", None, &["products", "homepage"]));

        let removed = store.invalidate_tag("products");

        assert_eq!(removed, 1);
        // The entry held "homepage" too; its association must be gone.
        assert!(store.tag_index().is_empty());
    }

    #[test]
    fn test_invalidate_unknown_tag_is_noop() {
        let mut store = EntryStore::new();
        assert_eq!(store.invalidate_tag("missing"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_expired() {
        let mut store = EntryStore::new();
        store.put(entry("short", Some(Duration::from_secs(1)), &["products"]));
        store.put(entry("long", Some(Duration::from_secs(600)), &["products"]));

        tokio::time::advance(Duration::from_secs(2)).await;

        let removed = store.sweep_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        // Only the surviving entry may remain in the tag index.
        assert_eq!(store.tag_index().keys_for("products").unwrap().len(), 1);
    }

    #[test]
    fn test_store_stats() {
        let mut store = EntryStore::new();
        store.put(entry("popular", None, &[]));
        store.record_hit();
        store.record_miss();
        store.invalidate_tag("missing");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.invalidated_keys, 0);
        assert_eq!(stats.total_entries, 1);
    }
}
