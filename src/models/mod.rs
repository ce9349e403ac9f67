use serde::Deserialize;

pub mod movie;

pub use movie::MovieSummary;

// ============================================================================
// OMDb API Types
// ============================================================================

/// Raw search envelope returned by the OMDb `?s=` endpoint
///
/// Successful searches carry `Response: "True"` and a `Search` list; failures
/// (including "no matches") carry `Response: "False"` and an `Error` message.
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchEnvelope {
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Search", default)]
    pub search: Option<Vec<MovieSummary>>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbSearchEnvelope {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}
