//! Cache configuration.

use std::time::Duration;

pub const DEFAULT_CACHE_KEY: &str = "joke:current";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 10;
pub const DEFAULT_CACHE_CONNECT_TIMEOUT_MS: u64 = 250;
pub const DEFAULT_CACHE_RESPONSE_TIMEOUT_MS: u64 = 250;

/// Resolved cache settings handed to the backend and the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Redis connection URL; `None` selects the in-process backend.
    pub url: Option<String>,
    /// Key of the current-joke slot.
    pub key: String,
    /// Lifetime of a populated slot.
    pub ttl: Duration,
    /// Upper bound on establishing a backend connection.
    pub connect_timeout: Duration,
    /// Upper bound on a single backend command.
    pub response_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: DEFAULT_CACHE_KEY.to_string(),
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            connect_timeout: Duration::from_millis(DEFAULT_CACHE_CONNECT_TIMEOUT_MS),
            response_timeout: Duration::from_millis(DEFAULT_CACHE_RESPONSE_TIMEOUT_MS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            url: settings.url.clone(),
            key: settings.key.clone(),
            ttl: settings.ttl,
            connect_timeout: settings.connect_timeout,
            response_timeout: settings.response_timeout,
        }
    }
}
