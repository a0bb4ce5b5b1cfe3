//! Redis-backed response cache for shared deployments.

use ag_core::ResponseCache;
use async_trait::async_trait;
use errors::CacheError;
use redis::aio::ConnectionManager;
use std::time::Duration;

pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connect and verify the server is reachable.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Backend {
            reason: e.to_string(),
        })?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::Backend {
                reason: e.to_string(),
            })?;
        Ok(RedisCache { manager })
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend {
                reason: e.to_string(),
            })?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if !ttl.is_zero() {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        let _: () = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
