use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppResult;
use crate::services::{CatalogClient, OmdbClient, RandomSampler, SampleRequest};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogClient>,
    pub sampler: Arc<RandomSampler>,
    /// Sample size and attempt budget used when a request does not override them
    pub sample_defaults: SampleRequest,
}

impl AppState {
    /// Creates state around an existing catalog with default sampling settings
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            sampler: Arc::new(RandomSampler::new(catalog.clone())),
            catalog,
            sample_defaults: SampleRequest::default(),
        }
    }

    /// Builds the OMDb-backed state described by `config`
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let catalog: Arc<dyn CatalogClient> = Arc::new(OmdbClient::new(
            config.omdb_api_key.clone(),
            config.omdb_api_url.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
        )?);

        let sampler = RandomSampler::new(catalog.clone())
            .with_max_consecutive_failures(config.random_max_consecutive_failures);

        Ok(Self {
            catalog,
            sampler: Arc::new(sampler),
            sample_defaults: SampleRequest {
                target_count: config.random_sample_size,
                max_attempts: config.random_max_attempts,
            },
        })
    }
}
