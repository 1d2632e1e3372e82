use serde::{Deserialize, Serialize};

mod catalog;
mod context;
mod recommendation;
mod similarity;

pub use catalog::{Catalog, Movie};
pub use context::{ArtifactOrigin, RecommendationContext};
pub use recommendation::{
    Neighbor, RecommendationRequest, RecommendationResponse, RecommendedMovie,
};
pub use similarity::SimilarityMatrix;

// ============================================================================
// OMDb API Types
// ============================================================================

/// Value OMDb puts in `Poster` when it has no image
pub const OMDB_NO_POSTER: &str = "N/A";

/// Raw API response from GET /?t={title}
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbResponse {
    /// "True" when the title was found, "False" otherwise
    pub response: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default, rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    /// Explanation OMDb sends alongside `"Response": "False"`
    #[serde(default)]
    pub error: Option<String>,
}

impl OmdbResponse {
    pub fn is_found(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    /// The poster field, unless it is missing, blank, or "N/A"
    pub fn poster_url(&self) -> Option<&str> {
        self.poster
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != OMDB_NO_POSTER)
    }
}
