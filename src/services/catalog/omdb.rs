/// OMDb catalog client
///
/// Searches go to `GET {api_url}?apikey=..&s=<term>&type=movie[&page=n]`.
/// OMDb reports "no matches" (and "too many results" for very short terms)
/// as a `Response: "False"` envelope, which maps to an empty page here.
/// Envelopes that signal a broken setup (bad key, exhausted quota) are
/// treated as the catalog being unavailable.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{MovieSummary, OmdbSearchEnvelope},
    services::catalog::CatalogClient,
};

const MEDIA_TYPE: &str = "movie";

/// Fragments of OMDb error messages that mean the service is unusable
const FATAL_ERROR_MARKERS: &[&str] = &["api key", "request limit", "something went wrong"];

#[derive(Clone)]
pub struct OmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbClient {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    /// Turns a decoded envelope into a result page
    fn normalize(envelope: OmdbSearchEnvelope) -> AppResult<Vec<MovieSummary>> {
        if !envelope.is_success() {
            let message = envelope.error.unwrap_or_default();
            let lowered = message.to_lowercase();

            if FATAL_ERROR_MARKERS.iter().any(|m| lowered.contains(m)) {
                return Err(AppError::UpstreamUnavailable(format!(
                    "Movie catalog rejected the request: {}",
                    message
                )));
            }

            tracing::debug!(reason = %message, "Catalog reported no matches");
            return Ok(Vec::new());
        }

        let movies = envelope.search.unwrap_or_default();

        if let Some(bad) = movies.iter().find(|m| !m.is_well_formed()) {
            return Err(AppError::UpstreamUnavailable(format!(
                "Movie catalog returned a malformed entry (id: {:?})",
                bad.id
            )));
        }

        Ok(movies)
    }
}

#[async_trait::async_trait]
impl CatalogClient for OmdbClient {
    async fn search(&self, term: &str, page: Option<u32>) -> AppResult<Vec<MovieSummary>> {
        let mut params = vec![
            ("apikey", self.api_key.clone()),
            ("s", term.to_string()),
            ("type", MEDIA_TYPE.to_string()),
        ];
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, term = %term, "Catalog request failed");
                AppError::UpstreamUnavailable("Failed to reach the movie catalog".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::UpstreamUnavailable(format!(
                "Movie catalog returned status {}",
                status
            )));
        }

        let envelope: OmdbSearchEnvelope = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, term = %term, "Catalog response could not be decoded");
            AppError::UpstreamUnavailable("Movie catalog returned an unreadable response".to_string())
        })?;

        let movies = Self::normalize(envelope)?;

        tracing::debug!(
            term = %term,
            page = ?page,
            results = movies.len(),
            provider = self.name(),
            "Catalog search completed"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
