use serde::{Deserialize, Serialize};

/// One catalog search hit
///
/// Serialized with the catalog's field names so that search results, random
/// samples and stored favourites all share one JSON shape. Equality looks at
/// `id` only: two records with the same id are the same movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Catalog-wide unique identifier, the only key used for equality checks
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "Type", default)]
    pub media_type: String,
}

impl PartialEq for MovieSummary {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MovieSummary {}

impl MovieSummary {
    /// A record is usable only when it carries an id and a title
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty() && !self.title.trim().is_empty()
    }
}
