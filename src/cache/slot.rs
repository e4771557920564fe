//! The current-joke slot.
//!
//! Wraps a [`CacheBackend`] with the slot key and TTL and absorbs backend
//! failures: a failed read is a miss, a failed write or delete is logged and
//! dropped. Callers never see a [`CacheError`] except through [`JokeCache::ping`].

use std::{sync::Arc, time::Duration};

use metrics::counter;
use tracing::{debug, warn};

use super::backend::{CacheBackend, CacheError};
use super::config::CacheConfig;

pub const METRIC_CACHE_HIT_TOTAL: &str = "jokeminute_cache_hit_total";
pub const METRIC_CACHE_MISS_TOTAL: &str = "jokeminute_cache_miss_total";
pub const METRIC_CACHE_ERROR_TOTAL: &str = "jokeminute_cache_error_total";
pub const METRIC_CACHE_INVALIDATE_TOTAL: &str = "jokeminute_cache_invalidate_total";

const TARGET: &str = "jokeminute::cache";

#[derive(Clone)]
pub struct JokeCache {
    backend: Arc<dyn CacheBackend>,
    key: Arc<str>,
    ttl: Duration,
}

impl JokeCache {
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            backend,
            key: Arc::from(config.key.as_str()),
            ttl: config.ttl,
        }
    }

    /// Read the slot. Backend errors and empty values count as misses.
    pub async fn read(&self) -> Option<String> {
        match self.backend.get(&self.key).await {
            Ok(Some(text)) if !text.is_empty() => {
                counter!(METRIC_CACHE_HIT_TOTAL).increment(1);
                debug!(target = TARGET, key = %self.key, "cache hit");
                Some(text)
            }
            Ok(_) => {
                counter!(METRIC_CACHE_MISS_TOTAL).increment(1);
                debug!(target = TARGET, key = %self.key, "cache miss");
                None
            }
            Err(err) => {
                counter!(METRIC_CACHE_ERROR_TOTAL, "op" => "read").increment(1);
                counter!(METRIC_CACHE_MISS_TOTAL).increment(1);
                warn!(
                    target = TARGET,
                    key = %self.key,
                    backend = self.backend.name(),
                    error = %err,
                    "cache read failed; treating as miss"
                );
                None
            }
        }
    }

    /// Populate the slot with `text` for the configured TTL.
    pub async fn store(&self, text: &str) {
        if let Err(err) = self.backend.set_with_ttl(&self.key, text, self.ttl).await {
            counter!(METRIC_CACHE_ERROR_TOTAL, "op" => "store").increment(1);
            warn!(
                target = TARGET,
                key = %self.key,
                backend = self.backend.name(),
                error = %err,
                "cache write failed"
            );
        }
    }

    /// Delete the slot whether or not it currently holds a value.
    pub async fn invalidate(&self) {
        counter!(METRIC_CACHE_INVALIDATE_TOTAL).increment(1);
        if let Err(err) = self.backend.delete(&self.key).await {
            counter!(METRIC_CACHE_ERROR_TOTAL, "op" => "invalidate").increment(1);
            warn!(
                target = TARGET,
                key = %self.key,
                backend = self.backend.name(),
                error = %err,
                "cache invalidation failed; slot will expire on its own"
            );
        }
    }

    /// Liveness check against the backend.
    pub async fn ping(&self) -> Result<(), CacheError> {
        self.backend.ping().await
    }
}
