//! Object cache used as a read-through memo across requests.
//!
//! Values are plain strings keyed by `(group, key)`. Writers only ever
//! `add`, so concurrent requests racing to populate the same key are
//! harmless: the first value sticks and every writer computes the same one.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get(&self, group: &str, key: &str) -> Option<String>;

    /// Store `value` unless the key is already present. Returns whether it was stored.
    async fn add(&self, group: &str, key: &str, value: String) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<(String, String), String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectCache for MemoryCache {
    async fn get(&self, group: &str, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        entries.get(&(group.to_string(), key.to_string())).cloned()
    }

    async fn add(&self, group: &str, key: &str, value: String) -> bool {
        let Ok(mut entries) = self.entries.write() else {
            return false;
        };
        let slot = (group.to_string(), key.to_string());
        if entries.contains_key(&slot) {
            return false;
        }
        entries.insert(slot, value);
        true
    }
}

/// Cache that never remembers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl ObjectCache for NoCache {
    async fn get(&self, _group: &str, _key: &str) -> Option<String> {
        None
    }

    async fn add(&self, _group: &str, _key: &str, _value: String) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_keeps_first_value() {
        let cache = MemoryCache::new();

        assert!(cache.add("site-options", "network:1:main_site", "4".into()).await);
        assert!(!cache.add("site-options", "network:1:main_site", "9".into()).await);
        assert_eq!(
            cache.get("site-options", "network:1:main_site").await.as_deref(),
            Some("4")
        );
    }

    #[tokio::test]
    async fn groups_are_separate() {
        let cache = MemoryCache::new();
        cache.add("a", "k", "1".into()).await;

        assert_eq!(cache.get("b", "k").await, None);
        assert_eq!(cache.len(), 1);
    }
}
