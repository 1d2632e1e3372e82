use std::cmp::Ordering;

use crate::{
    error::{AppError, AppResult},
    models::{
        Catalog, Neighbor, RecommendationContext, RecommendationResponse, RecommendedMovie,
        SimilarityMatrix,
    },
    services::posters::PosterResolver,
};

pub const DEFAULT_RECOMMENDATION_COUNT: usize = 5;

/// Finds the `k` catalog entries most similar to `query_title`
///
/// The query's row is sorted by descending score, ties keeping catalog order.
/// The top entry is assumed to be the query itself (its self-similarity is the
/// row maximum) and is skipped. If the matrix breaks that assumption the
/// skipped entry is a genuine neighbour instead. Catalogs smaller than `k + 1`
/// yield fewer results.
pub fn recommend(
    catalog: &Catalog,
    matrix: &SimilarityMatrix,
    query_title: &str,
    k: usize,
) -> AppResult<Vec<Neighbor>> {
    let position = catalog.position(query_title).ok_or_else(|| {
        AppError::NotFound(format!("Movie '{}' is not in the catalog", query_title))
    })?;

    let row = matrix.row(position).ok_or_else(|| {
        AppError::MalformedArtifact(format!(
            "similarity matrix has no row {} for '{}'",
            position, query_title
        ))
    })?;

    let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| descending(a.1, b.1));

    ranked
        .into_iter()
        .skip(1)
        .take(k)
        .map(|(index, score)| -> AppResult<Neighbor> {
            let movie = catalog.get(index).ok_or_else(|| {
                AppError::MalformedArtifact(format!(
                    "similarity matrix column {} has no catalog entry",
                    index
                ))
            })?;
            Ok(Neighbor {
                index,
                title: movie.title.clone(),
                score,
            })
        })
        .collect()
}

/// NaN ranks below every number, including negative infinity
fn descending(a: f64, b: f64) -> Ordering {
    a.is_nan()
        .cmp(&b.is_nan())
        .then_with(|| b.partial_cmp(&a).unwrap_or(Ordering::Equal))
}

/// Recommends movies similar to `query_title` and attaches their posters
pub async fn recommend_with_posters(
    context: &RecommendationContext,
    posters: &PosterResolver,
    query_title: &str,
    k: usize,
) -> AppResult<RecommendationResponse> {
    let neighbors = recommend(&context.catalog, &context.matrix, query_title, k)?;

    tracing::info!(
        query = %query_title,
        results = neighbors.len(),
        "Recommendations selected"
    );

    let titles: Vec<String> = neighbors.iter().map(|n| n.title.clone()).collect();
    let poster_urls = posters.resolve_all(&titles).await;

    let recommendations = neighbors
        .into_iter()
        .zip(poster_urls)
        .map(|(neighbor, poster_url)| RecommendedMovie::from_neighbor(neighbor, poster_url))
        .collect();

    Ok(RecommendationResponse {
        query: query_title.to_string(),
        recommendations,
    })
}
