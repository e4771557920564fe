//! Bundled joke catalogue and the seeding routine.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{JokesRepo, JokesSeedRepo, RepoError};
use crate::cache::JokeCache;
use crate::domain::error::DomainError;
use crate::domain::jokes::JokeText;

const CATALOGUE: &str = include_str!("../../seed/jokes.txt");

/// Parse the bundled catalogue, one joke per non-blank line.
pub fn catalogue() -> Result<Vec<JokeText>, DomainError> {
    CATALOGUE
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(JokeText::parse)
        .collect()
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("bundled catalogue is invalid: {0}")]
    Catalogue(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Unchanged { count: u64 },
    Replaced { previous: u64, inserted: u64 },
}

#[derive(Clone)]
pub struct SeedService {
    reader: Arc<dyn JokesRepo>,
    writer: Arc<dyn JokesSeedRepo>,
    cache: JokeCache,
}

impl SeedService {
    pub fn new(
        reader: Arc<dyn JokesRepo>,
        writer: Arc<dyn JokesSeedRepo>,
        cache: JokeCache,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    /// Make the store hold exactly the bundled catalogue.
    ///
    /// A store whose row count already matches is left alone unless `force`
    /// is set. Any replacement clears the cache slot afterwards.
    pub async fn run(&self, force: bool) -> Result<SeedOutcome, SeedError> {
        let jokes = catalogue()?;
        let expected = jokes.len() as u64;
        let previous = self.reader.count_jokes().await?;

        if previous == expected && !force {
            info!(
                target = "jokeminute::seed",
                count = previous,
                "store already holds the catalogue"
            );
            return Ok(SeedOutcome::Unchanged { count: previous });
        }

        let inserted = self.writer.replace_all_jokes(&jokes).await?;
        self.cache.invalidate().await;

        info!(
            target = "jokeminute::seed",
            previous,
            inserted,
            "catalogue seeded"
        );
        Ok(SeedOutcome::Replaced { previous, inserted })
    }
}
