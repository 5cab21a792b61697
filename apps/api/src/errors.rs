use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type covering every pipeline stage.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant aborts the remaining pipeline for its request; the audit
/// insert is the only failure that is swallowed instead of surfaced here.
/// Blocking-mode clients always receive `{ "success": false, "error": "..." }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No resume file provided")]
    MissingInput,

    #[error("Neither job posting nor job URL provided")]
    MissingJobSource,

    #[error("Invalid form data: {0}")]
    InvalidForm(String),

    #[error("Failed to extract text from file: {0}")]
    ExtractionFailed(String),

    #[error("Text extraction resulted in empty text")]
    ExtractionEmpty,

    #[error("Failed to fetch job posting: {0}")]
    ScrapeFailed(String),

    #[error("Analysis generation failed: {0}")]
    GenerationFailed(String),

    #[error("Analysis response was not in the requested format: {0}")]
    MalformedAnalysis(String),

    #[error("Cover letter generation failed: {0}")]
    CoverLetterGenerationFailed(String),

    #[error("Required configuration is missing: {0}")]
    ConfigurationMissing(&'static str),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingInput | AppError::MissingJobSource | AppError::InvalidForm(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ExtractionFailed(_) | AppError::ExtractionEmpty => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::ScrapeFailed(_)
            | AppError::GenerationFailed(_)
            | AppError::MalformedAnalysis(_)
            | AppError::CoverLetterGenerationFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::ConfigurationMissing(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
