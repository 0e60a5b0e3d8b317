//! Fast-tier freshness flags.
//!
//! A flag under a fingerprint key means "the artifact for this fingerprint
//! exists in storage". Absence means nothing; callers fall back to storage.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[async_trait]
pub trait FreshnessCache: Send + Sync + 'static {
    /// True when an unexpired flag is present
    async fn get(&self, key: &str) -> bool;

    async fn set_with_ttl(&self, key: &str, ttl: Duration);

    /// Returns whether a flag was removed
    async fn delete(&self, key: &str) -> bool;
}

/// Process-local cache with per-entry expiry and a size bound
#[derive(Debug, Clone)]
pub struct InMemoryFreshnessCache {
    entries: Arc<DashMap<String, Instant>>,
    max_entries: usize,
}

impl Default for InMemoryFreshnessCache {
    fn default() -> Self {
        Self::new(100_000)
    }
}

impl InMemoryFreshnessCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self, now: Instant) {
        self.entries.retain(|_, expires_at| *expires_at > now);
        if self.entries.len() < self.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| *entry.value())
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            debug!(key = %key, "Evicted freshness flag");
        }
    }
}

#[async_trait]
impl FreshnessCache for InMemoryFreshnessCache {
    async fn get(&self, key: &str) -> bool {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(expires_at) if *expires_at > now => return true,
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, expires_at| *expires_at <= now);
        }
        false
    }

    async fn set_with_ttl(&self, key: &str, ttl: Duration) {
        let now = Instant::now();
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.make_room(now);
        }
        self.entries.insert(key.to_string(), now + ttl);
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemoryFreshnessCache::default();
        assert!(!cache.get("bundle_a").await);
        cache.set_with_ttl("bundle_a", Duration::from_secs(60)).await;
        assert!(cache.get("bundle_a").await);
        assert!(cache.delete("bundle_a").await);
        assert!(!cache.get("bundle_a").await);
    }

    #[tokio::test]
    async fn test_expired_flag_is_absent() {
        let cache = InMemoryFreshnessCache::default();
        cache.set_with_ttl("bundle_a", Duration::ZERO).await;
        assert!(!cache.get("bundle_a").await);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_bounded_size_evicts_soonest_expiry() {
        let cache = InMemoryFreshnessCache::new(2);
        cache.set_with_ttl("short", Duration::from_secs(10)).await;
        cache.set_with_ttl("long", Duration::from_secs(1000)).await;
        cache.set_with_ttl("new", Duration::from_secs(500)).await;

        assert_eq!(cache.len(), 2);
        assert!(!cache.get("short").await);
        assert!(cache.get("long").await);
        assert!(cache.get("new").await);
    }
}
