//! Decoding of the pickled catalog and similarity artifacts.
//!
//! The catalog is accepted either as a list of records
//! (`[{"title": ..., "movie_id": ...}, ...]`) or as a dict of columns
//! (`{"title": [...], "movie_id": [...]}`). The similarity matrix is a list of
//! numeric rows. Pickled pandas/numpy objects are not understood and must be
//! exported as plain lists and dicts first.

use serde::Deserialize;
use serde_pickle::DeOptions;

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, SimilarityMatrix},
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogPickle {
    Records(Vec<CatalogRecord>),
    Columns(CatalogColumns),
}

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    title: String,
    #[serde(default)]
    movie_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CatalogColumns {
    title: Vec<String>,
    #[serde(default)]
    movie_id: Option<Vec<i64>>,
}

fn options() -> DeOptions {
    DeOptions::new().decode_strings()
}

pub fn decode_catalog(bytes: &[u8]) -> AppResult<Catalog> {
    let pickle: CatalogPickle = serde_pickle::from_slice(bytes, options()).map_err(|e| {
        tracing::error!(error = %e, "Failed to decode movie catalog");
        AppError::MalformedArtifact(format!(
            "movie catalog must be a list of records or a dict of columns with a 'title' field: {}",
            e
        ))
    })?;

    match pickle {
        CatalogPickle::Records(records) => Ok(Catalog::new(
            records.into_iter().map(|r| (r.title, r.movie_id)),
        )),
        CatalogPickle::Columns(columns) => match columns.movie_id {
            Some(ids) if ids.len() != columns.title.len() => {
                Err(AppError::MalformedArtifact(format!(
                    "movie catalog has {} titles but {} movie ids",
                    columns.title.len(),
                    ids.len()
                )))
            }
            Some(ids) => Ok(Catalog::new(
                columns.title.into_iter().zip(ids.into_iter().map(Some)),
            )),
            None => Ok(Catalog::from_titles(columns.title)),
        },
    }
}

pub fn decode_similarity(bytes: &[u8]) -> AppResult<SimilarityMatrix> {
    let rows: Vec<Vec<f64>> = serde_pickle::from_slice(bytes, options()).map_err(|e| {
        tracing::error!(error = %e, "Failed to decode similarity matrix");
        AppError::MalformedArtifact(format!(
            "similarity matrix must be a list of numeric rows: {}",
            e
        ))
    })?;

    SimilarityMatrix::try_from_rows(rows)
}
