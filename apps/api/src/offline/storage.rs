use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::network::FetchResponse;

#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub response: FetchResponse,
    pub stored_at: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(response: FetchResponse) -> Self {
        Self {
            response,
            stored_at: Utc::now(),
        }
    }
}

/// One version-tagged store: request key → response. Writes overwrite by key.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    entries: HashMap<String, CachedResponse>,
}

impl CacheStore {
    pub fn put(&mut self, key: impl Into<String>, response: FetchResponse) {
        self.entries
            .insert(key.into(), CachedResponse::new(response));
    }

    pub fn get(&self, key: &str) -> Option<&CachedResponse> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn merge(&mut self, other: CacheStore) {
        self.entries.extend(other.entries);
    }
}

/// All stores, by name.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    stores: BTreeMap<String, CacheStore>,
}

impl CacheStorage {
    /// Returns the named store, creating it empty if needed.
    pub fn open(&mut self, name: &str) -> &mut CacheStore {
        self.stores.entry(name.to_string()).or_default()
    }

    pub fn get(&self, name: &str) -> Option<&CacheStore> {
        self.stores.get(name)
    }

    /// Adds every entry of `store` to the named store.
    pub fn commit(&mut self, name: &str, store: CacheStore) {
        self.open(name).merge(store);
    }

    pub fn delete(&mut self, name: &str) -> bool {
        self.stores.remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.stores.keys().cloned().collect()
    }
}
