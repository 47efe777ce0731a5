use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::ingest::extractor::extract_text;
use crate::ingest::upload::parse_multipart;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub text: String,
}

/// POST /api/upload
///
/// Extracts and returns the normalized text of an uploaded PDF.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let document = parse_multipart(multipart).await?.require_pdf()?;
    let extracted = extract_text(document.bytes, &state.extractor).await?;
    info!(
        filename = %document.filename,
        pages = extracted.page_count,
        "Extracted uploaded document"
    );
    Ok(Json(UploadResponse {
        text: extracted.text,
    }))
}
