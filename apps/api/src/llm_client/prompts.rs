// Shared prompt fragments.
// Each session mode defines its own templates in session/prompts.rs;
// this file only holds what every mode appends.

/// Output-format rule shared by every system message. Replies are shown to the
/// user as-is (or read aloud by the browser), so markup must not leak through.
pub const PLAIN_TEXT_ONLY: &str = "Respond in plain text only. \
    Do NOT use markdown, headings, bullet symbols or code fences. \
    Do NOT mention that you are an AI model.";

/// Joins a role description with the shared output-format rule.
pub fn system_message(role: &str) -> String {
    format!("{role} {PLAIN_TEXT_ONLY}")
}
