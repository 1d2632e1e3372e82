use serde::{Deserialize, Serialize};

/// A catalog entry selected as similar to the query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub title: String,
    pub score: f64,
}

/// A recommended movie ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedMovie {
    pub index: usize,
    pub title: String,
    pub score: f64,
    pub poster_url: String,
}

impl RecommendedMovie {
    pub fn from_neighbor(neighbor: Neighbor, poster_url: String) -> Self {
        Self {
            index: neighbor.index,
            title: neighbor.title,
            score: neighbor.score,
            poster_url,
        }
    }
}

/// Request to find movies similar to a selected title
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
}

/// Ranked recommendations, most similar first
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub query: String,
    pub recommendations: Vec<RecommendedMovie>,
}
