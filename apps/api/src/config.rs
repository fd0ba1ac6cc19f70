use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::salary::model::SalaryModel;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_COEFFICIENT_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_INSIGHT_MODEL: &str = "gemini-2.5-flash";

/// Application configuration loaded from environment variables.
///
/// `GEMINI_API_KEY` is deliberately optional: the service still boots without
/// it, and every request that needs the model reports a configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub coefficient_model: String,
    pub insight_model: String,
    pub fallback_model: SalaryModel,
    pub llm_timeout_secs: u64,
    pub llm_max_attempts: u32,
    pub cors_origin: Option<String>,
    pub session_idle_minutes: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let fallback_model = SalaryModel::new(
            parse_env("FALLBACK_BASE", SalaryModel::DEFAULT_FALLBACK.base)?,
            parse_env("FALLBACK_SLOPE", SalaryModel::DEFAULT_FALLBACK.slope)?,
        )
        .context("FALLBACK_BASE and FALLBACK_SLOPE must be finite numbers")?;

        let llm_max_attempts: u32 = parse_env("LLM_MAX_ATTEMPTS", 1)?;
        if llm_max_attempts == 0 {
            bail!("LLM_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            coefficient_model: optional_env("COEFFICIENT_MODEL")
                .unwrap_or_else(|| DEFAULT_COEFFICIENT_MODEL.to_string()),
            insight_model: optional_env("INSIGHT_MODEL")
                .unwrap_or_else(|| DEFAULT_INSIGHT_MODEL.to_string()),
            fallback_model,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 60)?,
            llm_max_attempts,
            cors_origin: optional_env("CORS_ORIGIN"),
            session_idle_minutes: parse_env("SESSION_IDLE_MINUTES", 60)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating unset and blank values alike.
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
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by unit tests; never touches the process environment.
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: Some("test-key".to_string()),
            gemini_base_url: "http://127.0.0.1:9".to_string(),
            coefficient_model: DEFAULT_COEFFICIENT_MODEL.to_string(),
            insight_model: DEFAULT_INSIGHT_MODEL.to_string(),
            fallback_model: SalaryModel::DEFAULT_FALLBACK,
            llm_timeout_secs: 5,
            llm_max_attempts: 1,
            cors_origin: None,
            session_idle_minutes: 60,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
