use serde::{Deserialize, Serialize};

/// Caller-owned session state. The server never stores this between requests;
/// each call receives whatever the caller chooses to replay.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionContext {
    /// Accumulated interview transcript. Only read in scoring mode.
    #[serde(default)]
    pub transcript: String,
    /// Credits the caller says it has left. Advisory only.
    #[serde(default)]
    pub credits_remaining: Option<u32>,
}

impl SessionContext {
    pub fn with_credits(credits_remaining: Option<u32>) -> Self {
        Self {
            credits_remaining,
            ..Self::default()
        }
    }
}

/// Body of a follow-up interview turn.
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewTurnRequest {
    /// The candidate's latest answer. Blank or absent asks for a first question.
    #[serde(default)]
    pub answer: Option<String>,
    /// Résumé text, used only when no answer is present.
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub credits_remaining: Option<u32>,
}

/// Body of a scoring request: the whole transcript in one go.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    #[serde(flatten)]
    pub session: SessionContext,
}

/// Successful result of any session mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReply {
    pub content: String,
    /// The caller's reported credits minus this request, echoed for convenience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_remaining: Option<u32>,
    /// Parsed score out of 10; scoring mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}
