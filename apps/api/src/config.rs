use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{LlmConfig, DEFAULT_API_URL, DEFAULT_MODEL};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Clone)]
pub struct Config {
    pub generation_api_key: String,
    pub generation_api_url: String,
    pub generation_model: String,
    pub generation_timeout_secs: u64,
    pub generation_max_attempts: u32,
    pub max_upload_bytes: usize,
    pub scratch_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            generation_api_key: require_env("GENERATION_API_KEY")?,
            generation_api_url: optional_env("GENERATION_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            generation_model: optional_env("GENERATION_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            generation_timeout_secs: parse_env("GENERATION_TIMEOUT_SECS", 60)?,
            generation_max_attempts: parse_env::<u32>("GENERATION_MAX_ATTEMPTS", 1)?.max(1),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            scratch_dir: optional_env("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Settings handed to the generation client at construction.
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_url: self.generation_api_url.clone(),
            api_key: self.generation_api_key.clone(),
            model: self.generation_model.clone(),
            timeout: Duration::from_secs(self.generation_timeout_secs),
            max_attempts: self.generation_max_attempts,
        }
    }
}

// The API key never reaches the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("generation_api_key", &"<redacted>")
            .field("generation_api_url", &self.generation_api_url)
            .field("generation_model", &self.generation_model)
            .field("generation_timeout_secs", &self.generation_timeout_secs)
            .field("generation_max_attempts", &self.generation_max_attempts)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("scratch_dir", &self.scratch_dir)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
