//! Caching of resolved mappings.
//!
//! - [`RedisCache`] - Redis-backed cache
//! - [`NullCache`] - no-op, used when Redis is not configured

mod null_cache;
mod redis_cache;
mod service;

pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService, CachedMapping};
