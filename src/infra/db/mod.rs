//! Postgres-backed repository implementations.

mod jokes;
mod util;

pub use util::map_sqlx_error;

use std::{sync::Arc, time::Duration};

use sqlx::{
    Postgres, Transaction,
    postgres::{PgPool, PgPoolOptions},
};
use tracing::{info, warn};

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Build a pool without touching the server; connections are opened on
    /// first acquire, so an unreachable database surfaces per query.
    pub fn connect_lazy(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(url)
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    /// Apply migrations, retrying every `retry` until the database accepts them.
    pub async fn migrate_until_ready(pool: PgPool, retry: Duration) {
        loop {
            match Self::run_migrations(&pool).await {
                Ok(()) => {
                    info!(target = "jokeminute::db", "migrations applied");
                    return;
                }
                Err(err) => {
                    warn!(
                        target = "jokeminute::db",
                        error = %err,
                        retry_seconds = retry.as_secs(),
                        "migrations failed; store unavailable until they succeed"
                    );
                    tokio::time::sleep(retry).await;
                }
            }
        }
    }
}
