use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::detection::error::DetectionError;
use crate::validators::ValidationError;

/// API failure taxonomy. Every variant renders as `{"error": ...}` JSON;
/// server-side failures are logged with their full cause and surfaced with a
/// generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The detection pipeline rejected or failed on the uploaded image.
    #[error("Image analysis failed: {0}")]
    Processing(#[from] DetectionError),

    #[error("{0}")]
    Database(String),

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Validation(format!("Invalid multipart body: {err}"))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Processing(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Processing(err) => tracing::error!("image processing failed: {err:?}"),
            ApiError::Database(message) => tracing::error!("database failure: {message}"),
            ApiError::Internal(err) => tracing::error!("unexpected error: {err:?}"),
            ApiError::Validation(_) | ApiError::NotFound(_) => {}
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
