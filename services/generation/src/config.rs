//! services/generation/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. A missing API key is a fatal
//! misconfiguration: generation must fail at startup, not silently degrade.

use courseforge_core::domain::GenerationStrategy;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub log_level: Level,
    pub groq_api_key: String,
    pub groq_api_base: String,
    pub youtube_api_key: String,
    pub unsplash_access_key: String,
    pub chat_model: String,
    pub stt_model: String,
    pub strategy: GenerationStrategy,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let database_url = require_var("DATABASE_URL")?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (all required) ---
        let groq_api_key = require_var("GROQ_API_KEY")?;
        let youtube_api_key = require_var("YOUTUBE_API_KEY")?;
        let unsplash_access_key = require_var("UNSPLASH_ACCESS_KEY")?;

        // --- Load Adapter-specific Settings ---
        let groq_api_base = std::env::var("GROQ_API_BASE")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "openai/gpt-oss-120b".to_string());
        let stt_model =
            std::env::var("STT_MODEL").unwrap_or_else(|_| "whisper-large-v3-turbo".to_string());

        let strategy_str = std::env::var("GENERATION_STRATEGY")
            .unwrap_or_else(|_| "optimized".to_string());
        let strategy = match strategy_str.to_lowercase().as_str() {
            "optimized" => GenerationStrategy::Optimized,
            "legacy" => GenerationStrategy::Legacy,
            other => {
                return Err(ConfigError::InvalidValue(
                    "GENERATION_STRATEGY".to_string(),
                    format!("'{}' is not one of: optimized, legacy", other),
                ))
            }
        };

        Ok(Self {
            database_url,
            log_level,
            groq_api_key,
            groq_api_base,
            youtube_api_key,
            unsplash_access_key,
            chat_model,
            stt_model,
            strategy,
        })
    }
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}
