use async_trait::async_trait;

use crate::{
    application::repos::{JokesRepo, JokesSeedRepo, RepoError},
    domain::{entities::JokeRecord, jokes::JokeText},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct JokeRow {
    id: i64,
    text: String,
}

impl From<JokeRow> for JokeRecord {
    fn from(row: JokeRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
        }
    }
}

#[async_trait]
impl JokesRepo for PostgresRepositories {
    async fn create_joke(&self, text: &JokeText) -> Result<i64, RepoError> {
        sqlx::query_scalar::<_, i64>("INSERT INTO jokes (text) VALUES ($1) RETURNING id")
            .bind(text.as_str())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_jokes(&self) -> Result<Vec<JokeRecord>, RepoError> {
        let rows = sqlx::query_as::<_, JokeRow>("SELECT id, text FROM jokes ORDER BY id")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(JokeRecord::from).collect())
    }

    async fn random_joke(&self) -> Result<Option<JokeRecord>, RepoError> {
        let row = sqlx::query_as::<_, JokeRow>(
            "SELECT id, text FROM jokes ORDER BY random() LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(JokeRecord::from))
    }

    async fn delete_joke(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM jokes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_jokes(&self) -> Result<u64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jokes")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        count
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}

#[async_trait]
impl JokesSeedRepo for PostgresRepositories {
    async fn replace_all_jokes(&self, texts: &[JokeText]) -> Result<u64, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        // Restart the sequence so a seeded store always holds ids 1..=n.
        sqlx::query("TRUNCATE jokes RESTART IDENTITY")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let mut inserted = 0u64;
        for text in texts {
            sqlx::query("INSERT INTO jokes (text) VALUES ($1)")
                .bind(text.as_str())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            inserted += 1;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(inserted)
    }
}
