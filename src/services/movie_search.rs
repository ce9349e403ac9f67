use crate::{
    error::{AppError, AppResult},
    models::MovieSummary,
    services::catalog::CatalogClient,
};

/// Free-text movie search against the catalog
///
/// Validates the query before any upstream call is made. A catalog that
/// answers with no matches yields `UpstreamEmpty`, so callers can tell an
/// unmatched query apart from an outage.
pub async fn search_movies(
    catalog: &dyn CatalogClient,
    query: Option<&str>,
) -> AppResult<Vec<MovieSummary>> {
    let query = query.map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(AppError::InvalidRequest(
            "Missing query parameter \"q\"".to_string(),
        ));
    }

    let movies = catalog.search(query, None).await.map_err(|e| {
        tracing::warn!(error = %e, query = %query, provider = catalog.name(), "Movie search failed");
        if e.is_upstream_failure() {
            AppError::UpstreamUnavailable("Failed to fetch from movie catalog".to_string())
        } else {
            e
        }
    })?;

    if movies.is_empty() {
        return Err(AppError::UpstreamEmpty(format!(
            "No movies found for \"{}\"",
            query
        )));
    }

    tracing::info!(query = %query, results = movies.len(), "Movie search completed");

    Ok(movies)
}
