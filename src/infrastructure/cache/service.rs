//! Cache contract for resolved mappings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::Record;

/// Errors reported by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),
    #[error("cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// The immutable part of a record, as kept in the cache.
///
/// The password never leaves the store; only whether one is set. `hit_count` is
/// not cached either, it is read from the store when a hit is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMapping {
    pub url: String,
    pub protected: bool,
    pub max_hit_count: i64,
}

impl From<&Record> for CachedMapping {
    fn from(record: &Record) -> Self {
        Self {
            url: record.url.clone(),
            protected: record.is_protected(),
            max_hit_count: record.max_hit_count,
        }
    }
}


/// Read-through cache in front of the mapping store.
///
/// Implementations are fail-open: backend errors are logged and reported as a
/// miss, so resolution falls back to the store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis with per-entry TTL
/// - [`crate::infrastructure::cache::NullCache`] - caching disabled
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up a token. `Ok(None)` on miss or backend error.
    async fn get_mapping(&self, token: &str) -> CacheResult<Option<CachedMapping>>;

    /// Stores a token. `ttl_seconds = None` uses the backend default.
    async fn set_mapping(
        &self,
        token: &str,
        mapping: &CachedMapping,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Drops a token, e.g. after the record was deleted.
    async fn invalidate(&self, token: &str) -> CacheResult<()>;

    async fn health_check(&self) -> bool;
}
