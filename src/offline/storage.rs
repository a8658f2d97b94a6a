use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::ShellResponse;

type NamedCache = HashMap<String, ShellResponse>;

/// In-memory set of named caches keyed by request path.
#[derive(Default)]
pub struct CacheStorage {
    caches: RwLock<HashMap<String, NamedCache>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, cache: &str, path: &str, response: ShellResponse) {
        let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
        caches
            .entry(cache.to_string())
            .or_default()
            .insert(path.to_string(), response);
    }

    pub fn match_in(&self, cache: &str, path: &str) -> Option<ShellResponse> {
        let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
        caches.get(cache).and_then(|c| c.get(path)).cloned()
    }

    pub fn has(&self, cache: &str) -> bool {
        let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
        caches.contains_key(cache)
    }

    pub fn keys(&self) -> Vec<String> {
        let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = caches.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn delete(&self, cache: &str) -> bool {
        let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
        caches.remove(cache).is_some()
    }

    /// Number of entries in one cache.
    pub fn len(&self, cache: &str) -> usize {
        let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
        caches.get(cache).map(HashMap::len).unwrap_or(0)
    }
}
