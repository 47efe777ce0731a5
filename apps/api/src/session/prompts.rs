//! Prompt composition for every session mode.
//!
//! Each template takes exactly one caller-supplied text, inserted verbatim and
//! never truncated here. Length limits belong to
//! the generation service.

use crate::llm_client::prompts::system_message;
use crate::llm_client::GenerationParams;
use crate::session::tone::ReviewTone;

/// Register constraint shared by both interview templates. Passed through
/// verbatim; reply quality depends on it.
pub const INTERVIEWER_REGISTER: &str =
    "Act as a formal interviewer, questions only, no commentary.";

/// Phrase separating a review instruction from the résumé text.
pub const RESUME_SEPARATOR: &str = "Here is the resume:";

/// First interview question. Replace `{resume_text}`.
const FIRST_QUESTION_TEMPLATE: &str = "Act as a formal interviewer, questions only, no commentary. \
Based on the candidate's resume below, ask the first interview question. \
Ask exactly one question.\n\nResume:\n{resume_text}";

/// Follow-up question. Replace `{previous_answer}`.
/// Only the latest answer is included; earlier turns live with the caller.
const NEXT_QUESTION_TEMPLATE: &str = "Act as a formal interviewer, questions only, no commentary. \
The candidate has just given the answer below. Ask the next interview question, \
following up on the answer where it is relevant. Ask exactly one question.\n\n\
Candidate's answer:\n{previous_answer}";

/// Transcript scoring. Replace `{transcript}`.
const CHAT_SCORE_TEMPLATE: &str = "Below is the full transcript of a mock job interview. \
Rate the candidate's overall performance. \
Return only a numeric score out of 10, with no other text.\n\nTranscript:\n{transcript}";

const REVIEW_ROLE: &str = "You are an experienced recruiter who reviews resumes.";
const INTERVIEW_ROLE: &str = "You are conducting a job interview.";
const SCORE_ROLE: &str = "You are an impartial interview assessor.";

/// What a prompt is for. Each kind has one text input, one system message and
/// fixed sampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Input: normalized résumé text.
    Review(ReviewTone),
    /// Input: normalized résumé text.
    FirstQuestion,
    /// Input: the candidate's most recent answer.
    NextQuestion,
    /// Input: the whole interview transcript.
    ChatScore,
}

impl PromptKind {
    pub fn name(&self) -> &'static str {
        match self {
            PromptKind::Review(_) => "review",
            PromptKind::FirstQuestion => "first_question",
            PromptKind::NextQuestion => "next_question",
            PromptKind::ChatScore => "chat_score",
        }
    }

    pub fn system(&self) -> String {
        match self {
            PromptKind::Review(_) => system_message(REVIEW_ROLE),
            PromptKind::FirstQuestion | PromptKind::NextQuestion => system_message(INTERVIEW_ROLE),
            PromptKind::ChatScore => system_message(SCORE_ROLE),
        }
    }

    pub fn params(&self) -> GenerationParams {
        match self {
            PromptKind::Review(_) => GenerationParams {
                temperature: 0.8,
                max_tokens: 700,
            },
            PromptKind::FirstQuestion | PromptKind::NextQuestion => GenerationParams {
                temperature: 0.7,
                max_tokens: 150,
            },
            PromptKind::ChatScore => GenerationParams {
                temperature: 0.0,
                max_tokens: 10,
            },
        }
    }
}

/// Builds the instruction text for `kind` around `input`.
pub fn compose(kind: PromptKind, input: &str) -> String {
    match kind {
        PromptKind::Review(tone) => {
            format!("{}\n\n{RESUME_SEPARATOR}\n{input}", tone.instruction())
        }
        PromptKind::FirstQuestion => FIRST_QUESTION_TEMPLATE.replace("{resume_text}", input),
        PromptKind::NextQuestion => NEXT_QUESTION_TEMPLATE.replace("{previous_answer}", input),
        PromptKind::ChatScore => CHAT_SCORE_TEMPLATE.replace("{transcript}", input),
    }
}
