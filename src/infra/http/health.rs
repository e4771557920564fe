use axum::{Json, extract::State};

use crate::application::health::HealthReport;

use super::HttpState;

/// Always 200; the body's `status` carries the verdict.
pub(super) async fn health(State(state): State<HttpState>) -> Json<HealthReport> {
    Json(state.health.check().await)
}
