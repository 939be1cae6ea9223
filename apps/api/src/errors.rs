use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The propagation policy: transport failures toward the LLM are fatal and
/// surface as 503; parse failures degrade inside the pipeline and only reach
/// this type (as `InvalidResponse`, 502) from endpoints that cannot tolerate
/// empty data; database write failures on persistence paths never get here
/// at all, they are logged and swallowed at the call site.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),

    #[error("Pipeline failed at {stage} stage: {message}")]
    Pipeline { stage: &'static str, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::LlmUnavailable(msg) => {
                tracing::error!("LLM unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    format!("LLM unavailable: {msg}"),
                )
            }
            AppError::InvalidResponse(msg) => {
                tracing::error!("Invalid LLM response: {msg}");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Pipeline { stage, message } => {
                tracing::error!("Pipeline failed at {stage} stage: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Analysis failed: {stage} stage: {message}"),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "detail": detail }));

        (status, body).into_response()
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Unavailable(msg) => AppError::LlmUnavailable(msg),
            LlmError::EmptyContent => AppError::InvalidResponse(e.to_string()),
            LlmError::InvalidJson => {
                AppError::InvalidResponse("LLM returned invalid JSON".to_string())
            }
        }
    }
}
