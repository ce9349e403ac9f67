/// Movie catalog abstraction
///
/// A catalog answers a single search request (term, optional page) with a
/// normalized list of movie summaries. The random sampler and the search
/// gateway only ever talk to this trait, so tests can swap in mocks or stubs.
use crate::{error::AppResult, models::MovieSummary};

pub mod omdb;

pub use omdb::OmdbClient;

/// Trait for movie catalog backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search the catalog for `term`, optionally at a given results page
    ///
    /// A "no matches" answer is an empty list, not an error. Transport
    /// failures and malformed responses fail the whole call; a partially
    /// parsed page is never returned.
    async fn search(&self, term: &str, page: Option<u32>) -> AppResult<Vec<MovieSummary>>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}
