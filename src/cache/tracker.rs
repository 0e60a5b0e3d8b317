//! Two-tier freshness check: fast cache first, durable storage second.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::freshness_cache::FreshnessCache;
use crate::storage::{BundleStorage, StorageResult};

#[derive(Clone)]
pub struct FreshnessTracker {
    cache: Arc<dyn FreshnessCache>,
    storage: Arc<dyn BundleStorage>,
    ttl: Duration,
}

impl std::fmt::Debug for FreshnessTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessTracker")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl FreshnessTracker {
    pub fn new(cache: Arc<dyn FreshnessCache>, storage: Arc<dyn BundleStorage>, ttl: Duration) -> Self {
        Self { cache, storage, ttl }
    }

    /// Fresh when the flag is cached, or when the artifact exists in storage
    /// (the flag is then backfilled).
    pub async fn is_fresh(&self, key: &str, path: &str) -> StorageResult<bool> {
        if self.cache.get(key).await {
            return Ok(true);
        }

        if self.storage.exists(path).await? {
            debug!(key = %key, path = %path, "Backfilling freshness flag from storage");
            self.cache.set_with_ttl(key, self.ttl).await;
            return Ok(true);
        }

        Ok(false)
    }

    pub async fn mark_fresh(&self, key: &str) {
        self.cache.set_with_ttl(key, self.ttl).await;
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.cache.delete(key).await
    }
}
