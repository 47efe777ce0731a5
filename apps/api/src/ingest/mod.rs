// Document ingestion: multipart intake, PDF extraction, text normalization.

pub mod extractor;
pub mod handlers;
pub mod normalizer;
pub mod upload;
