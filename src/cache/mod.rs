//! Current-joke cache.
//!
//! A single keyed slot holds the text of the joke most recently sampled from the
//! store. Two backends are available:
//!
//! - **Redis**: used when `cache.url` is configured; shared between processes.
//! - **Memory**: in-process fallback with the same TTL semantics.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! url = "redis://127.0.0.1:6379"
//! key = "joke:current"
//! ttl_seconds = 10
//! connect_timeout_ms = 250
//! response_timeout_ms = 250
//! ```
//!
//! Backend failures never fail a request: reads degrade to misses and writes are
//! logged and dropped. See [`JokeCache`].

mod backend;
mod config;
mod lock;
mod memory;
mod redis_store;
mod slot;

pub use backend::{CacheBackend, CacheError, build_backend};
pub use config::{
    CacheConfig, DEFAULT_CACHE_CONNECT_TIMEOUT_MS, DEFAULT_CACHE_KEY,
    DEFAULT_CACHE_RESPONSE_TIMEOUT_MS, DEFAULT_CACHE_TTL_SECS,
};
pub use memory::MemoryCache;
pub use redis_store::RedisCache;
pub use slot::{
    JokeCache, METRIC_CACHE_ERROR_TOTAL, METRIC_CACHE_HIT_TOTAL, METRIC_CACHE_INVALIDATE_TOTAL,
    METRIC_CACHE_MISS_TOTAL,
};
