use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::RequestId;
use crate::models::{
    ArtifactOrigin, RecommendationContext, RecommendationRequest, RecommendationResponse,
};
use crate::services::{recommendations, UploadOutcome};
use crate::storage::ArtifactKind;

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ready: bool,
    pub movies: usize,
    pub origin: Option<ArtifactOrigin>,
    pub movies_path: Option<String>,
    pub similarity_path: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl From<Option<&RecommendationContext>> for StatusResponse {
    fn from(context: Option<&RecommendationContext>) -> Self {
        match context {
            Some(context) => Self {
                ready: true,
                movies: context.catalog.len(),
                origin: Some(context.origin),
                movies_path: Some(context.movies_path.display().to_string()),
                similarity_path: Some(context.similarity_path.display().to_string()),
                loaded_at: Some(context.loaded_at),
            },
            None => Self {
                ready: false,
                movies: 0,
                origin: None,
                movies_path: None,
                similarity_path: None,
                loaded_at: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadResponse {
    Staged { awaiting: ArtifactKind },
    Loaded { movies: usize },
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Whether recommendation data is loaded, and from where
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let context = state.provisioner.current().await;
    Json(StatusResponse::from(context.as_deref()))
}

/// Catalog titles in order, for the selection dropdown
pub async fn list_movies(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let context = state.current_context().await?;
    Ok(Json(context.catalog.titles().map(str::to_string).collect()))
}

/// Recommend movies similar to the selected title
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        "Processing recommendation request"
    );

    let context = state.current_context().await?;
    let response = recommendations::recommend_with_posters(
        &context,
        &state.posters,
        &request.title,
        state.recommendation_count,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        results = response.recommendations.len(),
        "Recommendation completed"
    );

    Ok(Json(response))
}

/// Store a manually uploaded artifact, loading the pair once both are present
pub async fn upload_artifact(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> AppResult<Json<UploadResponse>> {
    let kind: ArtifactKind = kind.parse()?;

    match state.provisioner.stage_upload(kind, &body).await? {
        UploadOutcome::Staged { awaiting } => Ok(Json(UploadResponse::Staged { awaiting })),
        UploadOutcome::Loaded(context) => Ok(Json(UploadResponse::Loaded {
            movies: context.catalog.len(),
        })),
    }
}

/// Re-run provisioning; the previous data stays installed on failure
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<StatusResponse>> {
    let context = state.provisioner.provision().await?;
    Ok(Json(StatusResponse::from(Some(context.as_ref()))))
}
