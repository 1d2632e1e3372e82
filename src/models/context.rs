use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};

use super::{Catalog, SimilarityMatrix};

/// Where the loaded artifacts came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactOrigin {
    /// Downloaded from the remote artifact source (or reused from a previous download)
    Remote,
    /// Supplied by the user through the manual upload fallback
    Upload,
}

/// Read-only data every recommendation is computed against
///
/// Built once per provisioning pass and swapped wholesale on reload.
#[derive(Debug, Clone)]
pub struct RecommendationContext {
    pub catalog: Catalog,
    pub matrix: SimilarityMatrix,
    pub origin: ArtifactOrigin,
    pub movies_path: PathBuf,
    pub similarity_path: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

impl RecommendationContext {
    /// Pairs a catalog with its matrix
    ///
    /// Only the dimensions are checked; row order must already match the catalog.
    pub fn new(
        catalog: Catalog,
        matrix: SimilarityMatrix,
        origin: ArtifactOrigin,
        movies_path: PathBuf,
        similarity_path: PathBuf,
    ) -> AppResult<Self> {
        if matrix.dim() != catalog.len() {
            return Err(AppError::MalformedArtifact(format!(
                "similarity matrix is {0}x{0} but the catalog has {1} movies",
                matrix.dim(),
                catalog.len()
            )));
        }

        Ok(Self {
            catalog,
            matrix,
            origin,
            movies_path,
            similarity_path,
            loaded_at: Utc::now(),
        })
    }
}
