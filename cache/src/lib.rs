//! # Response Cache
//!
//! Implementations of [`ag_core::ResponseCache`]: an in-memory TTL map
//! for single-process deployments and a Redis backend for shared ones.
//! The backend is selected by injected configuration through
//! [`create_cache`], never by feature detection inline in business code.

pub mod memory;
pub mod redis_backend;

pub use memory::MemoryCache;
pub use redis_backend::RedisCache;

use ag_core::ResponseCache;
use config::CacheConfig;
use std::sync::Arc;

/// Select a cache implementation from configuration.
///
/// A configured Redis URL that cannot be connected falls back to the
/// in-memory cache with a warning; the pipeline must keep working when
/// the cache tier is down.
pub async fn create_cache(config: &CacheConfig) -> Arc<dyn ResponseCache> {
    if let Some(url) = &config.redis_url {
        match RedisCache::connect(url).await {
            Ok(cache) => return Arc::new(cache),
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, using in-memory cache");
            }
        }
    }
    Arc::new(MemoryCache::new())
}
