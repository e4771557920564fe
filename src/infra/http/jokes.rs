use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::application::error::ErrorReport;
use crate::application::jokes::{DisplayJoke, JokeServiceError, JokeSource};
use crate::domain::entities::JokeRecord;

use super::{ApiError, HttpState};

const SOURCE: &str = "infra::http::jokes";

#[derive(Debug, Serialize)]
pub struct JokeResponse {
    pub joke: String,
    pub source: JokeSource,
    /// Seconds since the Unix epoch at response time.
    pub timestamp: f64,
}

impl From<DisplayJoke> for JokeResponse {
    fn from(joke: DisplayJoke) -> Self {
        Self {
            joke: joke.text,
            source: joke.source,
            timestamp: unix_timestamp(),
        }
    }
}

fn unix_timestamp() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1_000_000_000.0
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddJokeForm {
    pub joke: String,
}

#[derive(Debug, Serialize)]
pub struct AddJokeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

pub(super) async fn current_joke(State(state): State<HttpState>) -> Result<Response, ApiError> {
    let Some(joke) = state.jokes.current_joke().await? else {
        let body = JokeResponse::from(DisplayJoke::none_available());
        let mut response = (StatusCode::NOT_FOUND, Json(body)).into_response();
        ErrorReport::from_message(SOURCE, StatusCode::NOT_FOUND, "no jokes available")
            .attach(&mut response);
        return Ok(response);
    };
    Ok(Json(JokeResponse::from(joke)).into_response())
}

pub(super) async fn add_joke(
    State(state): State<HttpState>,
    Form(form): Form<AddJokeForm>,
) -> Result<Json<AddJokeResponse>, ApiError> {
    match state.jokes.add_joke(&form.joke).await {
        Ok(id) => Ok(Json(AddJokeResponse {
            success: true,
            id: Some(id),
        })),
        Err(JokeServiceError::Validation(_)) => Ok(Json(AddJokeResponse {
            success: false,
            id: None,
        })),
        Err(JokeServiceError::Repo(err)) => Err(ApiError::from(err)),
    }
}

pub(super) async fn list_jokes(
    State(state): State<HttpState>,
) -> Result<Json<Vec<JokeRecord>>, ApiError> {
    let jokes = state.jokes.list_jokes().await?;
    Ok(Json(jokes))
}

pub(super) async fn delete_joke(
    State(state): State<HttpState>,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    state.jokes.delete_joke(id).await?;
    Ok(Redirect::to("/jokes"))
}
