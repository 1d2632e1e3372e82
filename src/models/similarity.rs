use crate::error::{AppError, AppResult};

/// Square matrix of precomputed pairwise similarity scores
///
/// Row `i` holds the similarity of catalog entry `i` to every other entry.
/// The diagonal is expected to hold each row's maximum; this is not checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Wraps the given rows, rejecting anything that is not square
    pub fn try_from_rows(rows: Vec<Vec<f64>>) -> AppResult<Self> {
        let dim = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(AppError::MalformedArtifact(format!(
                "similarity matrix is not square: row {} has {} entries, expected {}",
                i,
                row.len(),
                dim
            )));
        }

        Ok(Self { rows })
    }

    pub fn dim(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }
}
