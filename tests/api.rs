use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

use jokeminute::application::health::HealthService;
use jokeminute::application::jokes::JokeService;
use jokeminute::application::repos::{JokesRepo, RepoError};
use jokeminute::cache::{CacheBackend, CacheConfig, CacheError, JokeCache, MemoryCache};
use jokeminute::domain::entities::JokeRecord;
use jokeminute::domain::jokes::JokeText;
use jokeminute::infra::http::{HttpState, REQUEST_ID_HEADER, build_router};

/// Store fake that always "samples" the lowest id.
#[derive(Default)]
struct MemoryJokes {
    rows: Mutex<Vec<JokeRecord>>,
    next_id: Mutex<i64>,
    down: AtomicBool,
}

impl MemoryJokes {
    async fn seeded(texts: &[&str]) -> Arc<Self> {
        let repo = Arc::new(Self::default());
        for text in texts {
            repo.create_joke(&JokeText::parse(text).expect("seed text"))
                .await
                .expect("seed row");
        }
        repo
    }

    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.down.load(Ordering::SeqCst) {
            Err(RepoError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl JokesRepo for MemoryJokes {
    async fn create_joke(&self, text: &JokeText) -> Result<i64, RepoError> {
        self.check()?;
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        self.rows.lock().await.push(JokeRecord {
            id: *next_id,
            text: text.to_string(),
        });
        Ok(*next_id)
    }

    async fn list_jokes(&self) -> Result<Vec<JokeRecord>, RepoError> {
        self.check()?;
        Ok(self.rows.lock().await.clone())
    }

    async fn random_joke(&self) -> Result<Option<JokeRecord>, RepoError> {
        self.check()?;
        Ok(self.rows.lock().await.first().cloned())
    }

    async fn delete_joke(&self, id: i64) -> Result<bool, RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }

    async fn count_jokes(&self) -> Result<u64, RepoError> {
        self.check()?;
        Ok(self.rows.lock().await.len() as u64)
    }
}

struct UnreachableCache;

#[async_trait]
impl CacheBackend for UnreachableCache {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }
}

fn app_with_backend(repo: Arc<MemoryJokes>, backend: Arc<dyn CacheBackend>) -> Router {
    let cache = JokeCache::new(backend, &CacheConfig::default());
    let repo: Arc<dyn JokesRepo> = repo;
    build_router(HttpState {
        jokes: Arc::new(JokeService::new(repo.clone(), cache.clone())),
        health: Arc::new(HealthService::new(repo, cache)),
    })
}

fn app(repo: Arc<MemoryJokes>) -> (Router, Arc<MemoryCache>) {
    let backend = Arc::new(MemoryCache::new());
    (app_with_backend(repo, backend.clone()), backend)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

async fn post_form(app: &Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, request).await
}

async fn json_body(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be json")
}

async fn current_joke(app: &Router) -> (StatusCode, Value) {
    let response = get(app, "/joke").await;
    let status = response.status();
    (status, json_body(response).await)
}

#[tokio::test]
async fn read_cache_delete_scenario() {
    let repo = MemoryJokes::seeded(&["A", "B"]).await;
    let (app, _) = app(repo);

    let (status, first) = current_joke(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["source"], "database");
    assert_eq!(first["joke"], "A");
    assert!(first["timestamp"].as_f64().expect("timestamp") > 0.0);

    let (_, second) = current_joke(&app).await;
    assert_eq!(second["source"], "cache");
    assert_eq!(second["joke"], first["joke"]);

    let response = post_form(&app, "/jokes/1/delete", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/jokes")
    );

    let (_, third) = current_joke(&app).await;
    assert_eq!(third["source"], "database");
    assert_eq!(third["joke"], "B");
}

#[tokio::test]
async fn empty_store_returns_sentinel_and_caches_nothing() {
    let repo = Arc::new(MemoryJokes::default());
    let (app, backend) = app(repo);

    let (status, body) = current_joke(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["joke"], "No jokes available!");
    assert_eq!(body["source"], "error");
    assert!(body["timestamp"].is_number());
    assert!(backend.is_empty());
}

#[tokio::test]
async fn add_then_list_and_next_read_misses() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    let (app, _) = app(repo);

    let (_, primed) = current_joke(&app).await;
    assert_eq!(primed["source"], "database");

    let response = post_form(&app, "/jokes", "joke=%20%20C%20").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let id = body["id"].as_i64().expect("id");

    let listed = json_body(get(&app, "/jokes").await).await;
    let listed = listed.as_array().expect("array");
    assert_eq!(listed.len(), 2);
    assert!(
        listed
            .iter()
            .any(|row| row["id"].as_i64() == Some(id) && row["text"] == "C")
    );

    let (_, next) = current_joke(&app).await;
    assert_eq!(next["source"], "database");
}

#[tokio::test]
async fn blank_add_reports_failure_without_writing() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    let (app, _) = app(repo.clone());

    for body in ["joke=", "joke=%20%20%20", ""] {
        let response = post_form(&app, "/jokes", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body.get("id").is_none());
    }

    assert_eq!(repo.count_jokes().await.expect("count"), 1);
}

#[tokio::test]
async fn deleting_unknown_id_redirects_and_clears_slot() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    let (app, backend) = app(repo.clone());

    current_joke(&app).await;
    assert!(!backend.is_empty());

    let response = post_form(&app, "/jokes/999/delete", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(backend.is_empty());
    assert_eq!(repo.count_jokes().await.expect("count"), 1);
}

#[tokio::test]
async fn store_outage_surfaces_as_503() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    let (app, backend) = app(repo.clone());

    current_joke(&app).await;
    repo.set_down(true);

    let response = post_form(&app, "/jokes/1/delete", "").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "store_unavailable");
    assert!(backend.is_empty());

    let (status, body) = current_joke(&app).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "store_unavailable");

    let response = post_form(&app, "/jokes", "joke=B").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = get(&app, "/jokes").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn add_reports_blank_input_before_touching_a_down_store() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    let (app, _) = app(repo.clone());
    repo.set_down(true);

    let response = post_form(&app, "/jokes", "joke=%20").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);

    let response = post_form(&app, "/jokes", "joke=B").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "store_unavailable");
}

#[tokio::test]
async fn unreachable_cache_degrades_to_database() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    let app = app_with_backend(repo, Arc::new(UnreachableCache));

    for _ in 0..2 {
        let (status, body) = current_joke(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "database");
    }

    let response = post_form(&app, "/jokes", "joke=B").await;
    assert_eq!(json_body(response).await["success"], true);
}

#[tokio::test]
async fn health_reports_both_checks() {
    let repo = MemoryJokes::seeded(&["A", "B"]).await;
    let (app, _) = app(repo);

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "ok");
    assert_eq!(body["cache"], "ok");
    assert_eq!(body["total_jokes"], 2);
}

#[tokio::test]
async fn health_is_unhealthy_when_cache_is_unreachable() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    let app = app_with_backend(repo, Arc::new(UnreachableCache));

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["store"], "ok");
    assert_eq!(body["cache"], "error");
    assert_eq!(body["total_jokes"], 1);
}

#[tokio::test]
async fn health_is_unhealthy_when_store_is_down() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    repo.set_down(true);
    let (app, _) = app(repo);

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["store"], "error");
    assert_eq!(body["cache"], "ok");
    assert_eq!(body["total_jokes"], 0);
}

#[tokio::test(start_paused = true)]
async fn cached_joke_expires_after_ttl() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    let (app, _) = app(repo);

    current_joke(&app).await;
    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(current_joke(&app).await.1["source"], "cache");

    tokio::time::advance(Duration::from_secs(6)).await;
    assert_eq!(current_joke(&app).await.1["source"], "database");
}

#[tokio::test]
async fn responses_carry_request_id_header() {
    let repo = MemoryJokes::seeded(&["A"]).await;
    let (app, _) = app(repo);

    let response = get(&app, "/jokes").await;
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .expect("request id header");
    assert_eq!(request_id.len(), 36);
}
