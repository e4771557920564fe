//! Store and cache reachability checks.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::application::repos::JokesRepo;
use crate::cache::JokeCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub store: CheckStatus,
    pub cache: CheckStatus,
    pub total_jokes: u64,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == OverallStatus::Healthy
    }
}

#[derive(Clone)]
pub struct HealthService {
    repo: Arc<dyn JokesRepo>,
    cache: JokeCache,
}

impl HealthService {
    pub fn new(repo: Arc<dyn JokesRepo>, cache: JokeCache) -> Self {
        Self { repo, cache }
    }

    /// Check both dependencies concurrently; neither check short-circuits the other.
    pub async fn check(&self) -> HealthReport {
        let (store, cache) = tokio::join!(self.repo.count_jokes(), self.cache.ping());

        let (store, total_jokes) = match store {
            Ok(count) => (CheckStatus::Ok, count),
            Err(err) => {
                warn!(target = "jokeminute::health", error = %err, "store check failed");
                (CheckStatus::Error, 0)
            }
        };

        let cache = match cache {
            Ok(()) => CheckStatus::Ok,
            Err(err) => {
                warn!(target = "jokeminute::health", error = %err, "cache check failed");
                CheckStatus::Error
            }
        };

        let status = if store == CheckStatus::Ok && cache == CheckStatus::Ok {
            OverallStatus::Healthy
        } else {
            OverallStatus::Unhealthy
        };

        HealthReport {
            status,
            store,
            cache,
            total_jokes,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn report_serializes_with_lowercase_statuses() {
        let report = HealthReport {
            status: OverallStatus::Unhealthy,
            store: CheckStatus::Ok,
            cache: CheckStatus::Error,
            total_jokes: 50,
        };

        assert_eq!(
            serde_json::to_value(&report).expect("serialize"),
            json!({
                "status": "unhealthy",
                "store": "ok",
                "cache": "error",
                "total_jokes": 50
            })
        );
        assert!(!report.is_healthy());
    }
}
