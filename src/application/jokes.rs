//! Joke catalogue service with a cache-aside current-joke read path.
//!
//! Reads consult the [`JokeCache`] slot first and only sample the store on a
//! miss, writing the sampled text back with the slot TTL. An empty store yields
//! `None` and is never cached. Every add and delete clears the slot as its last
//! step, so the next read after a mutation always re-samples the store.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::repos::{JokesRepo, RepoError};
use crate::cache::JokeCache;
use crate::domain::entities::JokeRecord;
use crate::domain::error::DomainError;
use crate::domain::jokes::JokeText;

/// Text served when the catalogue is empty.
pub const NO_JOKES_MESSAGE: &str = "No jokes available!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JokeSource {
    Cache,
    Database,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayJoke {
    pub text: String,
    pub source: JokeSource,
}

impl DisplayJoke {
    /// The sentinel returned when no joke exists.
    pub fn none_available() -> Self {
        Self {
            text: NO_JOKES_MESSAGE.to_string(),
            source: JokeSource::Error,
        }
    }
}

#[derive(Debug, Error)]
pub enum JokeServiceError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct JokeService {
    repo: Arc<dyn JokesRepo>,
    cache: JokeCache,
}

impl JokeService {
    pub fn new(repo: Arc<dyn JokesRepo>, cache: JokeCache) -> Self {
        Self { repo, cache }
    }

    /// Joke to display, served from the cache slot when populated.
    /// `None` means the store holds no jokes.
    pub async fn current_joke(&self) -> Result<Option<DisplayJoke>, RepoError> {
        if let Some(text) = self.cache.read().await {
            return Ok(Some(DisplayJoke {
                text,
                source: JokeSource::Cache,
            }));
        }

        let Some(joke) = self.repo.random_joke().await? else {
            debug!(target = "jokeminute::jokes", "store is empty; nothing to cache");
            return Ok(None);
        };

        self.cache.store(&joke.text).await;
        Ok(Some(DisplayJoke {
            text: joke.text,
            source: JokeSource::Database,
        }))
    }

    /// Validate and persist a joke, returning its id.
    pub async fn add_joke(&self, raw: &str) -> Result<i64, JokeServiceError> {
        let text = JokeText::parse(raw)?;
        let id = self.repo.create_joke(&text).await?;
        self.cache.invalidate().await;

        info!(target = "jokeminute::jokes", joke_id = id, "joke added");
        Ok(id)
    }

    pub async fn list_jokes(&self) -> Result<Vec<JokeRecord>, RepoError> {
        self.repo.list_jokes().await
    }

    /// Delete by id. The cache slot is cleared even when the id is unknown or
    /// the store call fails.
    pub async fn delete_joke(&self, id: i64) -> Result<bool, RepoError> {
        let result = self.repo.delete_joke(id).await;
        self.cache.invalidate().await;

        let removed = result?;
        info!(
            target = "jokeminute::jokes",
            joke_id = id,
            removed,
            "joke delete processed"
        );
        Ok(removed)
    }
}
