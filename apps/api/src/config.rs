use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::CompletionOptions;
use crate::sandbox::SandboxLimits;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";

/// Application configuration loaded from environment variables.
/// Only malformed values are errors; the API key is optional so the renderer
/// can run without generation.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,

    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    /// Header carrying the key; `None` means `Authorization: Bearer`.
    pub llm_auth_header: Option<String>,
    pub llm_app_referer: Option<String>,
    pub llm_app_title: Option<String>,
    pub llm_temperature: f64,
    pub llm_max_tokens: u32,
    pub llm_top_p: Option<f64>,
    pub llm_timeout_secs: u64,

    pub sandbox_timeout_ms: u64,
    pub sandbox_loop_limit: u64,

    pub profiles_dir: PathBuf,
    pub default_theme: String,
    pub default_accent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 3001)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),

            llm_api_key: optional_env("LLM_API_KEY").or_else(|| optional_env("OPENROUTER_API_KEY")),
            llm_api_url: optional_env("LLM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_auth_header: optional_env("LLM_AUTH_HEADER"),
            llm_app_referer: Some(
                optional_env("LLM_APP_REFERER").unwrap_or_else(|| "http://localhost:3001".to_string()),
            ),
            llm_app_title: Some(
                optional_env("LLM_APP_TITLE").unwrap_or_else(|| "Portfolio Generator".to_string()),
            ),
            llm_temperature: parse_env("LLM_TEMPERATURE", 0.8)?,
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", 8000)?,
            llm_top_p: Some(parse_env("LLM_TOP_P", 0.9)?),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 60)?,

            sandbox_timeout_ms: parse_env("SANDBOX_TIMEOUT_MS", 2000)?,
            sandbox_loop_limit: parse_env("SANDBOX_LOOP_LIMIT", 1_000_000)?,

            profiles_dir: optional_env("PROFILES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/profiles")),
            default_theme: optional_env("DEFAULT_THEME").unwrap_or_else(|| "minimal".to_string()),
            default_accent: optional_env("DEFAULT_ACCENT").unwrap_or_else(|| "#6366f1".to_string()),
        })
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.llm_model.clone(),
            temperature: self.llm_temperature,
            max_tokens: self.llm_max_tokens,
            top_p: self.llm_top_p,
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }

    pub fn sandbox_limits(&self) -> SandboxLimits {
        SandboxLimits {
            timeout: Duration::from_millis(self.sandbox_timeout_ms),
            loop_iteration_limit: self.sandbox_loop_limit,
            ..SandboxLimits::default()
        }
    }
}

/// Unset and blank variables are both `None`.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_defaults_and_errors() {
        std::env::remove_var("FOLIO_TEST_UNSET");
        assert_eq!(parse_env::<u16>("FOLIO_TEST_UNSET", 3001).unwrap(), 3001);

        std::env::set_var("FOLIO_TEST_PORT", "not-a-port");
        let err = parse_env::<u16>("FOLIO_TEST_PORT", 3001).unwrap_err();
        assert!(err.to_string().contains("FOLIO_TEST_PORT"));

        std::env::set_var("FOLIO_TEST_TEMP", " 0.5 ");
        assert_eq!(parse_env::<f64>("FOLIO_TEST_TEMP", 0.8).unwrap(), 0.5);
    }

    #[test]
    fn test_blank_optional_is_none() {
        std::env::set_var("FOLIO_TEST_BLANK", "   ");
        assert!(optional_env("FOLIO_TEST_BLANK").is_none());
    }
}
