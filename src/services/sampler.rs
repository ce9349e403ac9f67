use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::{seq::SliceRandom, Rng};

use crate::{
    error::{AppError, AppResult},
    models::MovieSummary,
    services::catalog::CatalogClient,
};

/// Search terms broad enough to hit plenty of movies on any page
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "a", "e", "i", "o", "u", "man", "love", "the", "dark", "star",
];

/// Result pages each attempt picks from
pub const PAGE_RANGE: RangeInclusive<u32> = 1..=5;

pub const DEFAULT_TARGET_COUNT: usize = 20;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// How many movies to collect and how many catalog calls that may take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRequest {
    pub target_count: usize,
    pub max_attempts: u32,
}

impl Default for SampleRequest {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Movies keyed by id, kept in first-insertion order
#[derive(Debug, Default)]
struct SampleAccumulator {
    positions: HashMap<String, usize>,
    movies: Vec<MovieSummary>,
}

impl SampleAccumulator {
    fn new() -> Self {
        Self::default()
    }

    /// Adds a movie, or replaces the stored value of an already-seen id in place
    fn insert(&mut self, movie: MovieSummary) {
        match self.positions.get(&movie.id) {
            Some(&index) => self.movies[index] = movie,
            None => {
                self.positions.insert(movie.id.clone(), self.movies.len());
                self.movies.push(movie);
            }
        }
    }

    fn len(&self) -> usize {
        self.movies.len()
    }

    fn into_movies(self) -> Vec<MovieSummary> {
        self.movies
    }
}

/// Assembles a random, de-duplicated set of movies from a term+page search API
///
/// The catalog has no "give me N random movies" call, so each attempt searches
/// a random term at a random page. Attempts run one after another and every
/// attempt counts against the budget, empty or not.
///
/// A failed attempt also consumes budget. Once `max_consecutive_failures`
/// attempts fail in a row the run stops early. A run in which no attempt
/// succeeded fails with `UpstreamUnavailable`; otherwise whatever was
/// collected is returned, even if short of the target.
pub struct RandomSampler {
    catalog: Arc<dyn CatalogClient>,
    vocabulary: Vec<String>,
    max_consecutive_failures: u32,
}

impl RandomSampler {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            catalog,
            vocabulary: DEFAULT_VOCABULARY.iter().map(|t| t.to_string()).collect(),
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
        }
    }

    /// Replaces the search terms; an empty list keeps the current ones
    pub fn with_vocabulary<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.trim().is_empty())
            .collect();

        if terms.is_empty() {
            tracing::warn!("Ignoring empty sampling vocabulary");
        } else {
            self.vocabulary = terms;
        }
        self
    }

    pub fn with_max_consecutive_failures(mut self, limit: u32) -> Self {
        self.max_consecutive_failures = limit.max(1);
        self
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Picks the term and page for the next attempt
    fn draw(&self) -> (String, u32) {
        let mut rng = rand::thread_rng();
        let term = self
            .vocabulary
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_VOCABULARY[0].to_string());
        let page = rng.gen_range(PAGE_RANGE);
        (term, page)
    }

    pub async fn sample(&self, request: SampleRequest) -> AppResult<Vec<MovieSummary>> {
        let mut accumulator = SampleAccumulator::new();
        let mut attempts = 0u32;
        let mut successes = 0u32;
        let mut consecutive_failures = 0u32;
        let mut last_error = None;

        while accumulator.len() < request.target_count && attempts < request.max_attempts {
            let (term, page) = self.draw();
            attempts += 1;

            match self.catalog.search(&term, Some(page)).await {
                Ok(movies) => {
                    successes += 1;
                    consecutive_failures = 0;

                    for movie in movies {
                        accumulator.insert(movie);
                        if accumulator.len() >= request.target_count {
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        term = %term,
                        page,
                        attempt = attempts,
                        provider = self.catalog.name(),
                        "Sampling attempt failed"
                    );
                    consecutive_failures += 1;
                    last_error = Some(e);

                    if consecutive_failures >= self.max_consecutive_failures {
                        tracing::warn!(
                            consecutive_failures,
                            collected = accumulator.len(),
                            "Giving up on random sample after repeated catalog failures"
                        );
                        break;
                    }
                }
            }
        }

        if successes == 0 {
            if let Some(e) = last_error {
                tracing::error!(error = %e, attempts, "Random sample failed entirely");
                return Err(AppError::UpstreamUnavailable(
                    "Failed to fetch random movies".to_string(),
                ));
            }
        }

        tracing::info!(
            requested = request.target_count,
            collected = accumulator.len(),
            attempts,
            "Random sample completed"
        );

        Ok(accumulator.into_movies())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::MockCatalogClient;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn movie(id: usize) -> MovieSummary {
        MovieSummary {
            id: format!("tt{:07}", id),
            title: format!("Movie {}", id),
            year: "2000".to_string(),
            poster: "N/A".to_string(),
            media_type: "movie".to_string(),
        }
    }

    fn assert_unique(movies: &[MovieSummary]) {
        let ids: HashSet<&str> = movies.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), movies.len(), "duplicate ids in sample");
    }

    fn request(target_count: usize, max_attempts: u32) -> SampleRequest {
        SampleRequest {
            target_count,
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_distinct_pages_fill_target_within_four_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog
            .expect_search()
            .times(1..=4)
            .returning(move |_, _| {
                let call = counter.fetch_add(1, Ordering::SeqCst);
                Ok((0..5).map(|i| movie(call * 5 + i)).collect())
            });

        let sampler = RandomSampler::new(Arc::new(catalog));
        let movies = sampler.sample(request(20, 15)).await.unwrap();

        assert_eq!(movies.len(), 20);
        assert!(calls.load(Ordering::SeqCst) <= 4);
        assert_unique(&movies);
    }

    #[tokio::test]
    async fn test_empty_catalog_uses_whole_budget() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog
            .expect_search()
            .times(15)
            .returning(|_, _| Ok(Vec::new()));

        let sampler = RandomSampler::new(Arc::new(catalog));
        let movies = sampler.sample(request(20, 15)).await.unwrap();

        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_pages_never_exceed_target() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog.expect_search().returning(move |_, _| {
            // each page shares half its ids with the previous one
            let call = counter.fetch_add(1, Ordering::SeqCst);
            Ok((0..6).map(|i| movie(call * 3 + i)).collect())
        });

        let sampler = RandomSampler::new(Arc::new(catalog));
        let movies = sampler.sample(request(10, 15)).await.unwrap();

        assert_eq!(movies.len(), 10);
        assert_unique(&movies);
    }

    #[tokio::test]
    async fn test_same_page_every_time_stops_at_unique_count() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog
            .expect_search()
            .times(15)
            .returning(|_, _| Ok((0..4).map(movie).collect()));

        let sampler = RandomSampler::new(Arc::new(catalog));
        let movies = sampler.sample(request(20, 15)).await.unwrap();

        assert_eq!(movies.len(), 4);
        assert_unique(&movies);
    }

    #[tokio::test]
    async fn test_stops_inserting_mid_batch() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog
            .expect_search()
            .times(1)
            .returning(|_, _| Ok((0..5).map(movie).collect()));

        let sampler = RandomSampler::new(Arc::new(catalog));
        let movies = sampler.sample(request(3, 15)).await.unwrap();

        let ids: Vec<&str> = movies.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["tt0000000", "tt0000001", "tt0000002"]);
    }

    #[tokio::test]
    async fn test_draws_terms_from_vocabulary_and_pages_in_range() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog
            .expect_search()
            .withf(|term, page| {
                let term = term.to_string();
                (term == "alpha" || term == "beta")
                    && matches!(page, Some(p) if PAGE_RANGE.contains(p))
            })
            .times(10)
            .returning(|_, _| Ok(Vec::new()));

        let sampler = RandomSampler::new(Arc::new(catalog)).with_vocabulary(["alpha", "beta"]);
        let movies = sampler.sample(request(5, 10)).await.unwrap();

        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_zero_target_makes_no_calls() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog.expect_search().times(0);

        let sampler = RandomSampler::new(Arc::new(catalog));
        let movies = sampler.sample(request(0, 15)).await.unwrap();

        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_dead_catalog_aborts_after_consecutive_failures() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog
            .expect_search()
            .times(3)
            .returning(|_, _| Err(AppError::UpstreamUnavailable("down".to_string())));

        let sampler = RandomSampler::new(Arc::new(catalog));
        let err = sampler.sample(request(20, 15)).await.unwrap_err();

        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_failure_after_progress_returns_partial_sample() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog.expect_search().times(4).returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok((0..5).map(movie).collect())
            } else {
                Err(AppError::UpstreamUnavailable("down".to_string()))
            }
        });

        let sampler = RandomSampler::new(Arc::new(catalog));
        let movies = sampler.sample(request(20, 15)).await.unwrap();

        assert_eq!(movies.len(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_intermittent_failures_keep_sampling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog.expect_search().returning(move |_, _| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            if call % 2 == 0 {
                Err(AppError::UpstreamUnavailable("flaky".to_string()))
            } else {
                Ok((0..5).map(|i| movie(call * 5 + i)).collect())
            }
        });

        let sampler = RandomSampler::new(Arc::new(catalog));
        let movies = sampler.sample(request(10, 15)).await.unwrap();

        assert_eq!(movies.len(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_accumulator_overwrites_duplicate_in_place() {
        let mut accumulator = SampleAccumulator::new();
        accumulator.insert(movie(1));
        accumulator.insert(movie(2));

        let mut updated = movie(1);
        updated.title = "Updated".to_string();
        accumulator.insert(updated);

        let movies = accumulator.into_movies();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "Updated");
        assert_eq!(movies[1].id, "tt0000002");
    }

    #[test]
    fn test_empty_vocabulary_is_ignored() {
        let catalog = MockCatalogClient::new();
        let sampler = RandomSampler::new(Arc::new(catalog)).with_vocabulary(Vec::<String>::new());
        assert_eq!(sampler.vocabulary().len(), DEFAULT_VOCABULARY.len());
    }
}
