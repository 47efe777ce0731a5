use axum::extract::multipart::{Multipart, MultipartRejection};
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// An uploaded document with its declared metadata. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Parsed fields from a multipart upload. Unknown fields are drained and ignored.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedDocument>,
    pub tone: Option<String>,
    pub credits_remaining: Option<String>,
}

impl UploadForm {
    /// Returns the document once it has passed the cheap declared-type checks.
    /// Content is not inspected here; that is the extractor's job.
    pub fn require_pdf(self) -> Result<UploadedDocument, AppError> {
        let file = self
            .file
            .ok_or_else(|| AppError::Validation("No file part".to_string()))?;
        validate_pdf_upload(&file)?;
        debug!(
            filename = %file.filename,
            content_type = ?file.content_type,
            size = file.bytes.len(),
            "Received upload"
        );
        Ok(file)
    }
}

/// Reads a multipart form into an `UploadForm`.
///
/// A body the extractor refused (wrong content type, bad boundary) is reported
/// as a validation error.
pub async fn parse_multipart(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadForm, AppError> {
    let mut multipart = multipart
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e.body_text())))?;
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file data: {e}")))?;
                form.file = Some(UploadedDocument {
                    filename,
                    content_type,
                    bytes,
                });
            }
            "tone" => {
                form.tone = Some(read_text(field, "tone").await?);
            }
            "credits_remaining" => {
                form.credits_remaining = Some(read_text(field, "credits_remaining").await?);
            }
            _ => {
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
            }
        }
    }

    Ok(form)
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))
}

/// Declared-type checks, in the order the upload endpoint has always reported them.
pub fn validate_pdf_upload(file: &UploadedDocument) -> Result<(), AppError> {
    if file.filename.trim().is_empty() {
        return Err(AppError::Validation("No selected file".to_string()));
    }
    if !file.filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("Only PDF files are allowed".to_string()));
    }
    if file.bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    Ok(())
}

/// Parses the optional credit counter sent alongside an upload.
pub fn parse_credits(raw: Option<&str>) -> Result<Option<u32>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s.parse::<u32>().map(Some).map_err(|_| {
            AppError::Validation("credits_remaining must be a non-negative integer".to_string())
        }),
    }
}
