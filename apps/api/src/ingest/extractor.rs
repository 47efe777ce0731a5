//! Document extraction: PDF bytes in, normalized text out.
//!
//! The bytes are spooled into a named temp file inside the scratch directory and
//! decoded by path with `pdf-extract`. The temp file is owned by a
//! `NamedTempFile` guard, so it is removed on every exit path (including a
//! panic inside the PDF library).

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::ingest::normalizer::normalize;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Separator placed between page texts before normalization.
pub const PAGE_SEPARATOR: &str = "\n";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("document does not start with a PDF header")]
    NotPdf,

    #[error("could not spool document to scratch space: {0}")]
    Scratch(#[from] std::io::Error),

    #[error("PDF decode failed: {0}")]
    Decode(String),

    #[error("PDF has no pages")]
    NoPages,
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::TooLarge { limit, .. } => {
                AppError::Validation(format!("File exceeds the {limit} byte upload limit"))
            }
            other => AppError::Extraction(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub max_bytes: usize,
    pub scratch_dir: PathBuf,
}

/// Normalized document text plus the number of pages it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

/// Joins per-page text with the page separator and normalizes the result.
pub fn assemble_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let joined = pages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR);
    normalize(&joined)
}

/// Extracts and normalizes text from PDF bytes on the blocking thread pool.
pub async fn extract_text(
    bytes: Bytes,
    config: &ExtractorConfig,
) -> Result<ExtractedText, ExtractionError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || extract_text_blocking(&bytes, &config))
        .await
        .map_err(|e| ExtractionError::Decode(format!("extraction task failed: {e}")))?
}

/// Synchronous extraction. Prefer `extract_text` from async code.
pub fn extract_text_blocking(
    bytes: &[u8],
    config: &ExtractorConfig,
) -> Result<ExtractedText, ExtractionError> {
    if bytes.len() > config.max_bytes {
        return Err(ExtractionError::TooLarge {
            size: bytes.len(),
            limit: config.max_bytes,
        });
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractionError::NotPdf);
    }

    let mut spool = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".pdf")
        .tempfile_in(&config.scratch_dir)?;
    spool.write_all(bytes)?;
    spool.flush()?;

    let decoded = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_by_pages(spool.path())
    }));

    if let Err(e) = spool.close() {
        warn!("Failed to remove scratch file: {e}");
    }

    let pages = match decoded {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => return Err(ExtractionError::Decode(e.to_string())),
        Err(_) => return Err(ExtractionError::Decode("PDF parser panicked".to_string())),
    };

    if pages.is_empty() {
        return Err(ExtractionError::NoPages);
    }

    let text = assemble_pages(&pages);
    if text.is_empty() {
        warn!("PDF with {} page(s) produced no text", pages.len());
    }
    debug!(
        "Extracted {} chars from {} page(s)",
        text.len(),
        pages.len()
    );

    Ok(ExtractedText {
        text,
        page_count: pages.len(),
    })
}
