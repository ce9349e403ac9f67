use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::MovieSummary;
use crate::services::movie_search;

use super::AppState;

/// Largest sample a caller may ask for
pub const MAX_RANDOM_COUNT: usize = 50;

// Request types

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RandomParams {
    pub count: Option<String>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Search the catalog by free-text query
pub async fn search_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    tracing::info!(
        request_id = %request_id,
        query = ?params.q,
        "Processing movie search"
    );

    let movies = movie_search::search_movies(state.catalog.as_ref(), params.q.as_deref()).await?;
    Ok(Json(movies))
}

/// Random, de-duplicated sample of movies
pub async fn random_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RandomParams>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    let mut request = state.sample_defaults;
    if let Some(count) = params.count.as_deref() {
        request.target_count = parse_count(count)?;
    }

    tracing::info!(
        request_id = %request_id,
        target_count = request.target_count,
        max_attempts = request.max_attempts,
        "Processing random sample"
    );

    let movies = state.sampler.sample(request).await?;
    Ok(Json(movies))
}

fn parse_count(raw: &str) -> AppResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(count) if (1..=MAX_RANDOM_COUNT).contains(&count) => Ok(count),
        _ => Err(AppError::InvalidRequest(format!(
            "\"count\" must be a number between 1 and {}",
            MAX_RANDOM_COUNT
        ))),
    }
}
