//! No-op cache.

use super::service::{CacheResult, CacheService, CachedMapping};
use async_trait::async_trait;
use tracing::debug;

/// Cache that stores nothing. Every lookup is a miss.
///
/// Used when `REDIS_URL` is not configured and in tests.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Caching disabled");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_mapping(&self, _token: &str) -> CacheResult<Option<CachedMapping>> {
        Ok(None)
    }

    async fn set_mapping(
        &self,
        _token: &str,
        _mapping: &CachedMapping,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _token: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_never_hits() {
        let cache = NullCache::new();
        let entry = CachedMapping {
            url: "https://example.org".to_string(),
            protected: false,
            max_hit_count: 0,
        };

        cache.set_mapping("abc", &entry, None).await.unwrap();
        assert!(cache.get_mapping("abc").await.unwrap().is_none());
        assert!(cache.health_check().await);
    }
}
