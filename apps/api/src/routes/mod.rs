pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ingest::handlers as ingest;
use crate::session::handlers as session;
use crate::state::AppState;

/// Room for multipart boundaries and the small text fields next to the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .extractor
        .max_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/upload", post(ingest::handle_upload))
        .route("/api/review", post(session::handle_review))
        .route("/api/interview/start", post(session::handle_interview_start))
        .route("/api/interview/next", post(session::handle_interview_next))
        .route("/api/interview/score", post(session::handle_score))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
