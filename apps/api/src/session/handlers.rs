//! Axum route handlers for the review and interview modes.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    Json,
};

use crate::errors::AppError;
use crate::ingest::upload::{parse_credits, parse_multipart};
use crate::session::models::{InterviewTurnRequest, ScoreRequest, SessionContext, SessionReply};
use crate::session::orchestrator;
use crate::session::tone::ReviewTone;
use crate::state::AppState;

/// Unwraps a JSON body, reporting malformed input as a validation error.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))
}

/// POST /api/review
///
/// Multipart: `file` (PDF), optional `tone`, optional `credits_remaining`.
/// Unknown tones fall back to friendly.
pub async fn handle_review(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SessionReply>, AppError> {
    let form = parse_multipart(multipart).await?;
    let tone = ReviewTone::from_input(form.tone.as_deref());
    let session = SessionContext::with_credits(parse_credits(form.credits_remaining.as_deref())?);
    let document = form.require_pdf()?;

    let reply = orchestrator::review(
        state.generator.as_ref(),
        &state.extractor,
        document.bytes,
        tone,
        &session,
    )
    .await?;
    Ok(Json(reply))
}

/// POST /api/interview/start
///
/// Multipart: `file` (PDF), optional `credits_remaining`. Returns the first question.
pub async fn handle_interview_start(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SessionReply>, AppError> {
    let form = parse_multipart(multipart).await?;
    let session = SessionContext::with_credits(parse_credits(form.credits_remaining.as_deref())?);
    let document = form.require_pdf()?;

    let reply = orchestrator::start_interview(
        state.generator.as_ref(),
        &state.extractor,
        document.bytes,
        &session,
    )
    .await?;
    Ok(Json(reply))
}

/// POST /api/interview/next
///
/// JSON: `{answer, resume_text?, credits_remaining?}`. Only the latest answer is
/// used; the caller keeps the rest of the conversation.
pub async fn handle_interview_next(
    State(state): State<AppState>,
    body: Result<Json<InterviewTurnRequest>, JsonRejection>,
) -> Result<Json<SessionReply>, AppError> {
    let request = json_body(body)?;
    let session = SessionContext::with_credits(request.credits_remaining);

    let reply = orchestrator::interview_turn(
        state.generator.as_ref(),
        request.resume_text.as_deref(),
        request.answer.as_deref(),
        &session,
    )
    .await?;
    Ok(Json(reply))
}

/// POST /api/interview/score
///
/// JSON: `{transcript, credits_remaining?}`. Returns the generated verdict and
/// the parsed score out of 10 when one could be read.
pub async fn handle_score(
    State(state): State<AppState>,
    body: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<SessionReply>, AppError> {
    let request = json_body(body)?;
    let reply = orchestrator::score(state.generator.as_ref(), &request.session).await?;
    Ok(Json(reply))
}
