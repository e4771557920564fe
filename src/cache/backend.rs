use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::{config::CacheConfig, memory::MemoryCache, redis_store::RedisCache};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache url: {0}")]
    InvalidUrl(String),
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Keyed string storage with per-entry expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

/// Select the backend described by `config`.
///
/// Redis connections are established lazily, so an unreachable server does not
/// prevent startup; only a malformed URL is rejected here.
pub fn build_backend(config: &CacheConfig) -> Result<Arc<dyn CacheBackend>, CacheError> {
    match config.url.as_deref() {
        Some(url) => {
            let backend = RedisCache::open(url, config.connect_timeout, config.response_timeout)?;
            info!(target = "jokeminute::cache", backend = "redis", "cache backend configured");
            Ok(Arc::new(backend))
        }
        None => {
            info!(target = "jokeminute::cache", backend = "memory", "cache backend configured");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}
