//! Redis-backed mapping cache.

use super::service::{CacheError, CacheResult, CacheService, CachedMapping};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

const KEY_PREFIX: &str = "mapping:";

/// Redis cache holding [`CachedMapping`] entries as JSON under `mapping:<token>`.
///
/// Connections are multiplexed through a `ConnectionManager`, which reconnects on
/// its own. Reads and writes are fail-open.
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects and verifies the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the server cannot
    /// be reached, or PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("invalid Redis URL: {}", e)))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let mut probe = conn.clone();
        probe
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            conn,
            default_ttl: default_ttl_seconds,
        })
    }

    fn key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, token)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_mapping(&self, token: &str) -> CacheResult<Option<CachedMapping>> {
        let mut conn = self.conn.clone();

        let raw = match conn.get::<_, Option<String>>(Self::key(token)).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(token, error = %e, "Redis GET failed");
                return Ok(None);
            }
        };

        let Some(raw) = raw else {
            debug!(token, "cache miss");
            return Ok(None);
        };

        match serde_json::from_str::<CachedMapping>(&raw) {
            Ok(entry) => {
                debug!(token, "cache hit");
                Ok(Some(entry))
            }
            Err(e) => {
                warn!(token, error = %e, "Discarding undecodable cache entry");
                let _ = conn.del::<_, i32>(Self::key(token)).await;
                Ok(None)
            }
        }
    }

    async fn set_mapping(
        &self,
        token: &str,
        mapping: &CachedMapping,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let payload = serde_json::to_string(mapping)
            .map_err(|e| CacheError::Operation(e.to_string()))?;
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let mut conn = self.conn.clone();

        if let Err(e) = conn.set_ex::<_, _, ()>(Self::key(token), payload, ttl).await {
            warn!(token, error = %e, "Redis SET failed");
        } else {
            debug!(token, ttl, "cache set");
        }

        Ok(())
    }

    async fn invalidate(&self, token: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();

        match conn.del::<_, i32>(Self::key(token)).await {
            Ok(deleted) if deleted > 0 => debug!(token, "cache invalidated"),
            Ok(_) => {}
            Err(e) => warn!(token, error = %e, "Redis DEL failed"),
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefix() {
        assert_eq!(RedisCache::key("abc123"), "mapping:abc123");
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_roundtrip_against_local_redis() {
        let cache = RedisCache::connect("redis://127.0.0.1:6379", 60)
            .await
            .unwrap();
        let entry = CachedMapping {
            url: "https://example.org".to_string(),
            protected: true,
            max_hit_count: 2,
        };

        cache.set_mapping("cache-test", &entry, None).await.unwrap();
        assert_eq!(cache.get_mapping("cache-test").await.unwrap(), Some(entry));

        cache.invalidate("cache-test").await.unwrap();
        assert!(cache.get_mapping("cache-test").await.unwrap().is_none());
    }
}
