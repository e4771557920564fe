//! HTTP surface: routes, handlers, and response logging.

mod error;
mod health;
mod jokes;
mod middleware;

pub use error::{ApiError, codes};
pub use middleware::{REQUEST_ID_HEADER, RequestContext};

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use crate::application::{health::HealthService, jokes::JokeService};

use self::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub jokes: Arc<JokeService>,
    pub health: Arc<HealthService>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/joke", get(jokes::current_joke))
        .route("/jokes", get(jokes::list_jokes).post(jokes::add_joke))
        .route("/jokes/{id}/delete", post(jokes::delete_joke))
        .route("/health", get(health::health))
        .with_state(state)
        .layer(from_fn(log_responses))
        .layer(from_fn(set_request_context))
}
