use std::sync::Arc;

use crate::ingest::extractor::ExtractorConfig;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Read-only after startup. There is no session table:
/// interview state lives with the caller.
#[derive(Clone)]
pub struct AppState {
    /// Generation backend. `LlmClient` in production, a fake in tests.
    pub generator: Arc<dyn TextGenerator>,
    /// Upload size cap and scratch directory for PDF extraction.
    pub extractor: ExtractorConfig,
}
