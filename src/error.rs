use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Provisioning failed for {artifact}: {reason}")]
    ProvisioningFailure { artifact: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Metadata unavailable: {0}")]
    MetadataUnavailable(String),

    #[error("Malformed artifact: {0}")]
    MalformedArtifact(String),

    #[error("Movie data is not loaded yet: {0}")]
    DataUnavailable(String),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn provisioning(artifact: impl Into<String>, reason: impl ToString) -> Self {
        AppError::ProvisioningFailure {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::MalformedArtifact(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::DataUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::ProvisioningFailure { .. } | AppError::HttpClient(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::ExternalApi(msg) | AppError::MetadataUnavailable(msg) => {
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Io(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
