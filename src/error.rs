use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Caller-supplied input failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The catalog answered but had no matches for the request
    #[error("No results: {0}")]
    UpstreamEmpty(String),

    /// The catalog could not be reached or answered with something unusable
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppError {
    /// Whether this error means the catalog itself failed, as opposed to the
    /// request being bad or simply unmatched
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamUnavailable(_) | AppError::HttpClient(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UpstreamEmpty(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UpstreamUnavailable(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(e) => {
                tracing::error!(error = %e, "Movie catalog request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to fetch from movie catalog".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
