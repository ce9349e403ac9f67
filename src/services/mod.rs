pub mod catalog;
pub mod movie_search;
pub mod sampler;

pub use catalog::{CatalogClient, OmdbClient};
pub use movie_search::search_movies;
pub use sampler::{RandomSampler, SampleRequest};
