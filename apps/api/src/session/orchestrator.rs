//! Session orchestration: sequences extraction, composition and generation
//! for the three interaction modes.
//!
//! Every call is a single traversal of its mode's stages. Nothing is kept
//! between calls: the interview "session" is whatever the caller replays, and
//! the credit counter is the caller's own number. The orchestrator checks that
//! number against zero and echoes it back decremented; it does no accounting.

use std::fmt;

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::ingest::extractor::{extract_text, ExtractorConfig};
use crate::llm_client::{GenerationError, TextGenerator};
use crate::session::models::{SessionContext, SessionReply};
use crate::session::prompts::{compose, PromptKind};
use crate::session::tone::ReviewTone;

/// Shown in place of generated text when the service answered but produced nothing usable.
pub const FALLBACK_CONTENT: &str = "No response was generated. Please try again.";

const MAX_SCORE: f32 = 10.0;

static SCORE_OUT_OF_TEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(-?\d+(?:\.\d+)?)\s*(?:/|out\s+of)\s*10\b").unwrap());
static SCORE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(out\s+of\s*|/\s*)?(-?\d+(?:\.\d+)?)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Review,
    Interview,
    Scoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Extracted,
    Composed,
    Generated,
    Returned,
    Failed,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Review => "review",
            Mode::Interview => "interview",
            Mode::Scoring => "scoring",
        })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Received => "received",
            Stage::Extracted => "extracted",
            Stage::Composed => "composed",
            Stage::Generated => "generated",
            Stage::Returned => "returned",
            Stage::Failed => "failed",
        })
    }
}

fn enter(mode: Mode, stage: Stage) {
    debug!(%mode, %stage, "session stage");
}

/// Logs the failure transition and passes the error through.
fn fail(mode: Mode, err: AppError) -> AppError {
    debug!(%mode, stage = %Stage::Failed, "session stage: {err}");
    err
}

/// Applies the caller-reported credit policy.
///
/// Returns the value to echo back. A caller that reports zero credits is
/// refused before any generation call; a caller that reports nothing is not
/// limited at all.
pub fn check_credits(session: &SessionContext) -> Result<Option<u32>, AppError> {
    match session.credits_remaining {
        Some(0) => Err(AppError::Validation("No credits remaining".to_string())),
        Some(n) => Ok(Some(n - 1)),
        None => Ok(None),
    }
}

/// Composes the prompt for `kind` and makes the single generation call.
///
/// An answer with no usable content becomes `FALLBACK_CONTENT`; every other
/// generation failure becomes `AppError::Generation`.
pub async fn run_generation(
    generator: &dyn TextGenerator,
    mode: Mode,
    kind: PromptKind,
    input: &str,
) -> Result<String, AppError> {
    let prompt = compose(kind, input);
    enter(mode, Stage::Composed);

    match generator
        .generate(&prompt, &kind.system(), kind.params())
        .await
    {
        Ok(text) => {
            enter(mode, Stage::Generated);
            Ok(text)
        }
        Err(GenerationError::NoContent) => {
            warn!(%mode, kind = kind.name(), "Generation produced no content, using fallback");
            enter(mode, Stage::Generated);
            Ok(FALLBACK_CONTENT.to_string())
        }
        Err(e) => Err(AppError::Generation(format!("{} failed: {e}", kind.name()))),
    }
}

/// Review mode: Received → Extracted → Composed → Generated → Returned.
pub async fn review(
    generator: &dyn TextGenerator,
    extractor: &ExtractorConfig,
    document: Bytes,
    tone: ReviewTone,
    session: &SessionContext,
) -> Result<SessionReply, AppError> {
    let mode = Mode::Review;
    enter(mode, Stage::Received);

    let run = async {
        let credits_remaining = check_credits(session)?;
        let extracted = extract_text(document, extractor).await?;
        debug!(
            %mode,
            pages = extracted.page_count,
            chars = extracted.text.len(),
            "Document extracted"
        );
        enter(mode, Stage::Extracted);

        let content =
            run_generation(generator, mode, PromptKind::Review(tone), &extracted.text).await?;
        Ok::<_, AppError>(SessionReply {
            content,
            credits_remaining,
            score: None,
        })
    };

    let reply = run.await.map_err(|e| fail(mode, e))?;
    info!(%mode, tone = tone.as_str(), "Review generated");
    enter(mode, Stage::Returned);
    Ok(reply)
}

/// Interview mode, one turn: Received(answer?) → Composed → Generated → Returned.
///
/// A non-blank `previous_answer` asks for a follow-up built from that answer
/// alone. Otherwise the first question is built from `resume_text`.
pub async fn interview_turn(
    generator: &dyn TextGenerator,
    resume_text: Option<&str>,
    previous_answer: Option<&str>,
    session: &SessionContext,
) -> Result<SessionReply, AppError> {
    let mode = Mode::Interview;
    enter(mode, Stage::Received);

    let run = async {
        let (kind, input) = select_question(resume_text, previous_answer)?;
        let credits_remaining = check_credits(session)?;
        let content = run_generation(generator, mode, kind, input).await?;
        Ok::<_, AppError>(SessionReply {
            content,
            credits_remaining,
            score: None,
        })
    };

    let reply = run.await.map_err(|e| fail(mode, e))?;
    enter(mode, Stage::Returned);
    Ok(reply)
}

/// Interview mode starting from an uploaded résumé: extraction, then a first-question turn.
pub async fn start_interview(
    generator: &dyn TextGenerator,
    extractor: &ExtractorConfig,
    document: Bytes,
    session: &SessionContext,
) -> Result<SessionReply, AppError> {
    check_credits(session).map_err(|e| fail(Mode::Interview, e))?;
    let extracted = extract_text(document, extractor)
        .await
        .map_err(|e| fail(Mode::Interview, e.into()))?;
    debug!(
        mode = %Mode::Interview,
        pages = extracted.page_count,
        chars = extracted.text.len(),
        "Document extracted"
    );
    enter(Mode::Interview, Stage::Extracted);
    interview_turn(generator, Some(&extracted.text), None, session).await
}

/// Picks first vs. next question purely from the presence of an answer.
fn select_question<'a>(
    resume_text: Option<&'a str>,
    previous_answer: Option<&'a str>,
) -> Result<(PromptKind, &'a str), AppError> {
    if let Some(answer) = previous_answer.map(str::trim).filter(|a| !a.is_empty()) {
        return Ok((PromptKind::NextQuestion, answer));
    }
    match resume_text.map(str::trim).filter(|r| !r.is_empty()) {
        Some(resume) => Ok((PromptKind::FirstQuestion, resume)),
        None => Err(AppError::Validation(
            "Either an answer or resume text is required".to_string(),
        )),
    }
}

/// Scoring mode: Received(transcript) → Composed → Generated → Returned.
pub async fn score(
    generator: &dyn TextGenerator,
    session: &SessionContext,
) -> Result<SessionReply, AppError> {
    let mode = Mode::Scoring;
    enter(mode, Stage::Received);

    let run = async {
        if session.transcript.trim().is_empty() {
            return Err(AppError::Validation("Transcript is required".to_string()));
        }
        let credits_remaining = check_credits(session)?;
        let content =
            run_generation(generator, mode, PromptKind::ChatScore, &session.transcript).await?;
        let score = parse_score(&content);
        if score.is_none() {
            warn!(%mode, "Could not read a score from the generated text");
        }
        Ok::<_, AppError>(SessionReply {
            content,
            credits_remaining,
            score,
        })
    };

    let reply = run.await.map_err(|e| fail(mode, e))?;
    enter(mode, Stage::Returned);
    Ok(reply)
}

/// Reads the score from a scoring reply, clamped to 0..=10.
///
/// A number written as `n/10` or `n out of 10` wins. Otherwise the first number
/// that is not itself a denominator is used, so `Out of 10, I give 6` reads 6.
pub fn parse_score(text: &str) -> Option<f32> {
    let raw = SCORE_OUT_OF_TEN
        .captures(text)
        .and_then(|c| c.get(1))
        .or_else(|| {
            SCORE_NUMBER
                .captures_iter(text)
                .find(|c| c.get(1).is_none())
                .and_then(|c| c.get(2))
        })?;
    raw.as_str()
        .parse::<f32>()
        .ok()
        .map(|score| score.clamp(0.0, MAX_SCORE))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{GenerationError, GenerationParams, TextGenerator};

    /// A recorded generation call.
    #[derive(Debug, Clone)]
    pub struct Call {
        pub prompt: String,
        pub system: String,
        pub params: GenerationParams,
    }

    /// What the fake answers with.
    #[derive(Debug, Clone)]
    pub enum Script {
        Reply(String),
        NoContent,
        ServerError,
    }

    /// In-memory generator that records every prompt it is given.
    pub struct FakeGenerator {
        script: Script,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeGenerator {
        pub fn new(script: Script) -> Self {
            Self {
                script,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(Script::Reply(text.to_string()))
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(
            &self,
            prompt: &str,
            system: &str,
            params: GenerationParams,
        ) -> Result<String, GenerationError> {
            self.calls.lock().unwrap().push(Call {
                prompt: prompt.to_string(),
                system: system.to_string(),
                params,
            });
            match &self.script {
                Script::Reply(text) => Ok(text.clone()),
                Script::NoContent => Err(GenerationError::NoContent),
                Script::ServerError => Err(GenerationError::Api {
                    status: 500,
                    message: "upstream exploded".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::test_support::{FakeGenerator, Script};
    use super::*;
    use crate::ingest::extractor::test_support::minimal_pdf;
    use crate::llm_client::prompts::PLAIN_TEXT_ONLY;
    use crate::session::prompts::INTERVIEWER_REGISTER;

    fn extractor_in(dir: &TempDir) -> ExtractorConfig {
        ExtractorConfig {
            max_bytes: 1024 * 1024,
            scratch_dir: dir.path().to_path_buf(),
        }
    }

    #[test]
    fn test_parse_score_forms() {
        assert_eq!(parse_score("7"), Some(7.0));
        assert_eq!(parse_score("7.5"), Some(7.5));
        assert_eq!(parse_score("8/10"), Some(8.0));
        assert_eq!(parse_score("Score: 6 out of 10"), Some(6.0));
        assert_eq!(parse_score("42"), Some(10.0));
        assert_eq!(parse_score("-3"), Some(0.0));
        assert_eq!(parse_score("Out of 10, I give 6"), Some(6.0));
        assert_eq!(parse_score("Communication was a 9, overall 7/10"), Some(7.0));
        assert_eq!(parse_score("no idea"), None);
        assert_eq!(parse_score(FALLBACK_CONTENT), None);
    }

    #[test]
    fn test_credit_policy() {
        assert_eq!(check_credits(&SessionContext::default()).unwrap(), None);
        assert_eq!(
            check_credits(&SessionContext::with_credits(Some(3))).unwrap(),
            Some(2)
        );
        assert_eq!(
            check_credits(&SessionContext::with_credits(Some(1))).unwrap(),
            Some(0)
        );
        let err = check_credits(&SessionContext::with_credits(Some(0))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_review_roast_end_to_end() {
        let dir = TempDir::new().unwrap();
        let generator = FakeGenerator::replying("Wow, 'experienced'. Bold claim.");
        let pdf = Bytes::from(minimal_pdf(&["Experienced engineer."]));

        let reply = review(
            &generator,
            &extractor_in(&dir),
            pdf,
            ReviewTone::Roast,
            &SessionContext::default(),
        )
        .await
        .unwrap();

        assert!(!reply.content.is_empty());
        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.starts_with(ReviewTone::Roast.instruction()));
        assert!(calls[0].prompt.contains("Experienced engineer"));
        assert!(!calls[0].prompt.contains("engineer."));
        assert_eq!(calls[0].params, PromptKind::Review(ReviewTone::Roast).params());
        assert_eq!(calls[0].system, PromptKind::Review(ReviewTone::Roast).system());
        assert!(calls[0].system.ends_with(PLAIN_TEXT_ONLY));
    }

    #[tokio::test]
    async fn test_review_bad_document_fails_before_generation() {
        let dir = TempDir::new().unwrap();
        let generator = FakeGenerator::replying("unused");

        let err = review(
            &generator,
            &extractor_in(&dir),
            Bytes::from_static(b"%PDF-1.4 garbage"),
            ReviewTone::Friendly,
            &SessionContext::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Extraction(_)));
        assert!(generator.calls().is_empty());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_review_no_content_uses_fallback() {
        let dir = TempDir::new().unwrap();
        let generator = FakeGenerator::new(Script::NoContent);

        let reply = review(
            &generator,
            &extractor_in(&dir),
            Bytes::from(minimal_pdf(&["Hello"])),
            ReviewTone::Advice,
            &SessionContext::default(),
        )
        .await
        .unwrap();

        assert_eq!(reply.content, FALLBACK_CONTENT);
    }

    #[tokio::test]
    async fn test_generation_failure_is_uniform() {
        let generator = FakeGenerator::new(Script::ServerError);
        let err = interview_turn(
            &generator,
            None,
            Some("I shipped it"),
            &SessionContext::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn test_first_question_from_resume() {
        let generator = FakeGenerator::replying("Describe your role at Acme.");
        let reply = interview_turn(
            &generator,
            Some("Jane Doe Rust Engineer Acme"),
            None,
            &SessionContext::with_credits(Some(5)),
        )
        .await
        .unwrap();

        assert_eq!(reply.content, "Describe your role at Acme.");
        assert_eq!(reply.credits_remaining, Some(4));
        let calls = generator.calls();
        assert!(calls[0].prompt.contains("Jane Doe Rust Engineer Acme"));
        assert!(calls[0].prompt.contains(INTERVIEWER_REGISTER));
    }

    #[tokio::test]
    async fn test_next_question_ignores_resume() {
        let generator = FakeGenerator::replying("How did you resolve conflicts?");
        interview_turn(
            &generator,
            Some("Jane Doe Rust Engineer Acme"),
            Some("I led a team of five"),
            &SessionContext::default(),
        )
        .await
        .unwrap();

        let prompt = &generator.calls()[0].prompt;
        assert!(prompt.contains("I led a team of five"));
        assert!(!prompt.contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_blank_answer_means_first_question() {
        let generator = FakeGenerator::replying("Q1");
        interview_turn(&generator, Some("Resume body"), Some("   "), &SessionContext::default())
            .await
            .unwrap();
        assert!(generator.calls()[0].prompt.contains("Resume body"));
    }

    #[tokio::test]
    async fn test_turn_without_answer_or_resume_is_validation() {
        let generator = FakeGenerator::replying("unused");
        let err = interview_turn(&generator, None, None, &SessionContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_zero_credits_refused_without_calling_service() {
        let generator = FakeGenerator::replying("unused");
        let err = interview_turn(
            &generator,
            None,
            Some("answer"),
            &SessionContext::with_credits(Some(0)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_interview_extracts_then_asks() {
        let dir = TempDir::new().unwrap();
        let generator = FakeGenerator::replying("Why did you leave?");
        let reply = start_interview(
            &generator,
            &extractor_in(&dir),
            Bytes::from(minimal_pdf(&["Staff engineer, 10 years."])),
            &SessionContext::default(),
        )
        .await
        .unwrap();

        assert_eq!(reply.content, "Why did you leave?");
        let prompt = &generator.calls()[0].prompt;
        assert!(prompt.contains("Staff engineer 10 years"));
    }

    #[tokio::test]
    async fn test_score_parses_number() {
        let generator = FakeGenerator::replying("8/10");
        let session = SessionContext {
            transcript: "Q: Why Rust?\nA: Fearless concurrency.".to_string(),
            credits_remaining: Some(2),
        };
        let reply = score(&generator, &session).await.unwrap();

        assert_eq!(reply.score, Some(8.0));
        assert_eq!(reply.credits_remaining, Some(1));
        let call = &generator.calls()[0];
        assert!(call.prompt.ends_with(&session.transcript));
        assert_eq!(call.params, PromptKind::ChatScore.params());
    }

    #[tokio::test]
    async fn test_score_empty_transcript_rejected() {
        let generator = FakeGenerator::replying("unused");
        let err = score(&generator, &SessionContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_score_fallback_has_no_score() {
        let generator = FakeGenerator::new(Script::NoContent);
        let session = SessionContext {
            transcript: "Q: a\nA: b".to_string(),
            credits_remaining: None,
        };
        let reply = score(&generator, &session).await.unwrap();
        assert_eq!(reply.content, FALLBACK_CONTENT);
        assert_eq!(reply.score, None);
    }
}
