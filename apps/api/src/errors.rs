use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Uniform failure shown to callers when a document cannot be read.
pub const EXTRACTION_FAILED_MESSAGE: &str = "Could not read text from the uploaded document";

/// Uniform failure shown to callers when the generation service misbehaves.
pub const GENERATION_FAILED_MESSAGE: &str =
    "The text generation service is unavailable, please try again";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every lower-layer failure is folded into one of these three variants before
/// it reaches a handler; only the `Validation` message is ever shown verbatim.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Generation error: {0}")]
    Generation(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// The message returned to the caller. Diagnostics for server-side
    /// failures stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Extraction(_) => EXTRACTION_FAILED_MESSAGE.to_string(),
            AppError::Generation(_) => GENERATION_FAILED_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(msg) => tracing::debug!("Rejected request: {msg}"),
            AppError::Extraction(msg) => tracing::error!("Extraction error: {msg}"),
            AppError::Generation(msg) => tracing::error!("Generation error: {msg}"),
        }

        let body = Json(json!({ "error": self.public_message() }));

        (self.status(), body).into_response()
    }
}
