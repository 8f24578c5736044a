//! Redis cache backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use sentinel_common::SentinelError;
use std::time::Duration;

use super::CacheBackend;

/// Redis-backed cache. The connection manager reconnects on its own and is
/// cloned per call, so no local locking is needed.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connect to Redis with connection manager (handles reconnection)
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client =
            redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        Ok(Self { conn })
    }
}

fn store_err(e: redis::RedisError) -> SentinelError {
    SentinelError::Store(e.to_string())
}

/// `EX` takes whole seconds; round up so short TTLs never become zero.
fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
    secs.max(1)
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SentinelError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs(ttl))
            .await
            .map_err(store_err)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SentinelError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(store_err)
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SentinelError> {
        // MULTI/EXEC instead of GETDEL keeps Redis < 6.2 supported
        let mut conn = self.conn.clone();
        let (value, _removed): (Option<String>, i64) = redis::pipe()
            .atomic()
            .get(key)
            .del(key)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<(), SentinelError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(store_err)
    }

    async fn ping(&self) -> Result<(), SentinelError> {
        let mut conn = self.conn.clone();
        let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        result.map(|_| ()).map_err(store_err)
    }
}
