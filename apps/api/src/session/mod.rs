// Review and interview sessions.
// Prompt composition, tone presets and the stateless orchestrator.
// All generation calls go through llm_client::TextGenerator.

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod tone;
