//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tokio::sync::OnceCell;

use super::backend::{CacheBackend, CacheError};

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::unavailable(err)
    }
}

/// Redis-backed cache.
///
/// The connection manager is created on first use and then shared; it
/// reconnects on its own after the server goes away. If the first connection
/// attempt fails the cell stays empty and the next call tries again.
///
/// Connecting makes a single attempt bounded by `connect_timeout`, and every
/// command is bounded by `response_timeout`, so an unreachable server costs a
/// request at most one of each.
pub struct RedisCache {
    client: Client,
    manager_config: ConnectionManagerConfig,
    manager: OnceCell<ConnectionManager>,
}

impl RedisCache {
    pub fn open(
        url: &str,
        connect_timeout: Duration,
        response_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(|err| CacheError::InvalidUrl(err.to_string()))?;
        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(0)
            .set_connection_timeout(connect_timeout)
            .set_response_timeout(response_timeout);
        Ok(Self {
            client,
            manager_config,
            manager: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                self.client
                    .get_connection_manager_with_config(self.manager_config.clone())
                    .await
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        // SETEX rejects zero.
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(CacheError::unavailable(format!(
                "unexpected PING reply `{pong}`"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::{CacheConfig, JokeCache};

    const BOUND: Duration = Duration::from_secs(5);

    // Nothing listens on port 1.
    fn closed_port_cache() -> RedisCache {
        RedisCache::open(
            "redis://127.0.0.1:1",
            Duration::from_millis(200),
            Duration::from_millis(200),
        )
        .expect("valid url")
    }

    #[tokio::test]
    async fn unreachable_server_reads_as_miss_within_bound() {
        let cache = JokeCache::new(Arc::new(closed_port_cache()), &CacheConfig::default());

        let first = tokio::time::timeout(BOUND, cache.read())
            .await
            .expect("first read should not hang");
        assert_eq!(first, None);

        let second = tokio::time::timeout(BOUND, cache.read())
            .await
            .expect("retry after failed connect should not hang");
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn unreachable_server_fails_writes_and_ping_within_bound() {
        let backend = Arc::new(closed_port_cache());
        let cache = JokeCache::new(backend.clone(), &CacheConfig::default());

        tokio::time::timeout(BOUND, cache.store("A"))
            .await
            .expect("store should not hang");
        tokio::time::timeout(BOUND, cache.invalidate())
            .await
            .expect("invalidate should not hang");

        let ping = tokio::time::timeout(BOUND, backend.ping())
            .await
            .expect("ping should not hang");
        assert!(ping.is_err());
    }
}
