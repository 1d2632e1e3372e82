use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::RecommendationContext;
use crate::services::{PosterResolver, Provisioner};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Loads, reloads and owns the installed recommendation data
    pub provisioner: Arc<Provisioner>,
    pub posters: PosterResolver,
    pub recommendation_count: usize,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        provisioner: Arc<Provisioner>,
        posters: PosterResolver,
        recommendation_count: usize,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            provisioner,
            posters,
            recommendation_count,
            max_upload_bytes,
        }
    }

    /// The currently installed context, or `DataUnavailable`
    pub async fn current_context(&self) -> AppResult<Arc<RecommendationContext>> {
        self.provisioner.current().await.ok_or_else(|| {
            AppError::DataUnavailable(
                "automatic download failed; upload movies and similarity artifacts".to_string(),
            )
        })
    }
}
