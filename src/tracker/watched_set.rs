//! Persisted sets of fully consumed items

use std::collections::BTreeSet;

use crate::store::{PersistentStore, StoreError, StoreKey};

/// Identifiers of items consumed at least once, ever
///
/// Ids are trimmed on the way in and on lookup. Persisted as a JSON array. Ordering carries no meaning; a sorted set keeps
/// the stored payload stable between writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchedSet {
    key: Option<StoreKey>,
    ids: BTreeSet<String>,
}

impl WatchedSet {
    pub fn load(store: &PersistentStore, key: StoreKey) -> Self {
        let ids: Vec<String> = store.read(key, Vec::new());
        Self {
            key: Some(key),
            ids: ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id.trim())
    }

    /// Returns `true` when the id was not present before
    pub fn insert(&mut self, id: &str) -> bool {
        let id = id.trim();
        !id.is_empty() && self.ids.insert(id.to_string())
    }

    /// Returns `true` when the id was present
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id.trim())
    }

    /// Flip membership, returning the new state
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.insert(id)
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// How many of `ids` are in the set
    pub fn count_present<S: AsRef<str>>(&self, ids: &[S]) -> usize {
        ids.iter().filter(|id| self.contains(id.as_ref())).count()
    }

    pub fn persist(&self, store: &PersistentStore) -> Result<(), StoreError> {
        match self.key {
            Some(key) => store.write(key, &self.ids),
            None => Ok(()),
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
