//! Short-lived response cache for slow-moving resources.
//!
//! The ATT&CK matrix and the filter-option catalog change rarely; caching
//! them avoids refetching on every navigation, mirroring the stale-time
//! windows the UI uses.

use std::time::Duration;

use moka::future::Cache as MokaCache;

/// TTL-bounded async cache keyed by request fingerprint.
pub struct ResponseCache<V: Clone + Send + Sync + 'static> {
    cache: MokaCache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> ResponseCache<V> {
    /// Creates a cache with the given TTL and capacity.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: String, value: V) {
        self.cache.insert(key, value).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Returns the cached value or runs the fallible loader, caching on
    /// success only.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: String, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.cache.get(&key).await {
            return Ok(value);
        }
        let value = loader().await?;
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }
}
