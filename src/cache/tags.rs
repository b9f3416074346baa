//! Tag Index Module
//!
//! Maps invalidation tags to the set of cache keys currently carrying them,
//! enabling bulk invalidation independent of key structure or TTL.
//!
//! The index is maintained exclusively by the entry store, which keeps it
//! bidirectionally consistent with the entries: `(tag, key)` is present here
//! if and only if `key`'s entry lists `tag`.

use std::collections::{HashMap, HashSet};

use crate::cache::CacheKey;

// == Tag Index ==
#[derive(Debug, Default)]
pub struct TagIndex {
    index: HashMap<String, HashSet<CacheKey>>,
}

impl TagIndex {
    /// Creates an empty tag index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Associate ==
    /// Records that `key`'s entry carries `tag`.
    pub(crate) fn associate(&mut self, tag: &str, key: &CacheKey) {
        self.index
            .entry(tag.to_string())
            .or_default()
            .insert(key.clone());
    }

    // == Disassociate ==
    /// Removes the `(tag, key)` association, pruning empty tag sets.
    pub(crate) fn disassociate(&mut self, tag: &str, key: &CacheKey) {
        if let Some(keys) = self.index.get_mut(tag) {
            keys.remove(key);
            if keys.is_empty() {
                self.index.remove(tag);
            }
        }
    }

    // == Remove Key ==
    /// Removes `key` from every tag set in `tags`.
    pub(crate) fn remove_key(&mut self, key: &CacheKey, tags: &HashSet<String>) {
        for tag in tags {
            self.disassociate(tag, key);
        }
    }

    // == Take ==
    /// Removes and returns the full key set for `tag`.
    ///
    /// An unknown tag yields an empty set, never an error.
    pub(crate) fn take(&mut self, tag: &str) -> HashSet<CacheKey> {
        self.index.remove(tag).unwrap_or_default()
    }

    /// Returns the keys currently associated with `tag`.
    pub fn keys_for(&self, tag: &str) -> Option<&HashSet<CacheKey>> {
        self.index.get(tag)
    }

    /// Returns the number of distinct tags with at least one key.
    pub fn tag_count(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no tag has any associated key.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key;

    fn key_for(name: &str) -> CacheKey {
        key::encode(&[name.to_string()], &()).unwrap()
    }

    #[test]
    fn test_associate_and_lookup() {
        let mut index = TagIndex::new();
        let k = key_for("popular");

        index.associate("products", &k);

        assert_eq!(index.tag_count(), 1);
        assert!(index.keys_for("products").unwrap().contains(&k));
    }

    #[test]
    fn test_disassociate_prunes_empty_sets() {
        let mut index = TagIndex::new();
        let k = key_for("popular");

        index.associate("products", &k);
        index.disassociate("products", &k);

        assert!(index.is_empty());
        assert!(index.keys_for("products").is_none());
    }

    #[test]
    fn test_remove_key_from_all_tags() {
        let mut index = TagIndex::new();
        let k = key_for("popular");
        let other = key_for("latest");

        index.associate("products", &k);
        index.associate("homepage", &k);
        index.associate("products", &other);

        let tags: HashSet<String> = ["products".to_string(), "homepage".to_string()].into();
        index.remove_key(&k, &tags);

        assert!(index.keys_for("homepage").is_none());
        assert!(index.keys_for("products").unwrap().contains(&other));
        assert!(!index.keys_for("products").unwrap().contains(&k));
    }

    #[test]
    fn test_take_unknown_tag_is_empty() {
        let mut index = TagIndex::new();
        assert!(index.take("missing").is_empty());
    }

    #[test]
    fn test_take_removes_tag() {
        let mut index = TagIndex::new();
        let k = key_for("popular");

        index.associate("products", &k);
        let taken = index.take("products");

        assert_eq!(taken.len(), 1);
        assert!(index.is_empty());
    }
}
