//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::JokeRecord;
use crate::domain::jokes::JokeText;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("database timeout")]
    Timeout,
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait JokesRepo: Send + Sync {
    /// Persist a joke and return its store-assigned id.
    async fn create_joke(&self, text: &JokeText) -> Result<i64, RepoError>;

    /// Every joke, ascending by id.
    async fn list_jokes(&self) -> Result<Vec<JokeRecord>, RepoError>;

    /// One joke chosen uniformly at query time, or `None` when empty.
    async fn random_joke(&self) -> Result<Option<JokeRecord>, RepoError>;

    /// Remove a joke. Returns whether a row existed; a missing id is not an error.
    async fn delete_joke(&self, id: i64) -> Result<bool, RepoError>;

    async fn count_jokes(&self) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait JokesSeedRepo: Send + Sync {
    /// Atomically replace the whole catalogue with `texts`, in order.
    async fn replace_all_jokes(&self, texts: &[JokeText]) -> Result<u64, RepoError>;
}
