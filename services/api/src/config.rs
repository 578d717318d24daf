//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use course_forge_core::models::{
    GenerationSettings, ModelProfile, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_MODELS, DEFAULT_TEMPERATURE,
};
use std::net::SocketAddr;
use std::time::Duration;
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
    pub bind_address: SocketAddr,
    /// When absent, courses are kept in memory for the lifetime of the process.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub openai_api_key: String,
    pub openai_api_base: Option<String>,
    pub generation_models: Vec<String>,
    pub generation_timeout: Duration,
    pub generation_max_tokens: u32,
    pub generation_temperature: f32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Provider Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let openai_api_base = std::env::var("OPENAI_API_BASE").ok();

        // --- Generation Settings ---
        let generation_models = match std::env::var("GENERATION_MODELS") {
            Ok(raw) => parse_model_list(&raw)?,
            Err(_) => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        let generation_timeout = match std::env::var("GENERATION_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => DEFAULT_ATTEMPT_TIMEOUT,
        };

        let generation_max_tokens = match std::env::var("GENERATION_MAX_TOKENS") {
            Ok(raw) => parse_number("GENERATION_MAX_TOKENS", &raw)?,
            Err(_) => DEFAULT_MAX_OUTPUT_TOKENS,
        };

        let generation_temperature = match std::env::var("GENERATION_TEMPERATURE") {
            Ok(raw) => parse_number("GENERATION_TEMPERATURE", &raw)?,
            Err(_) => DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            openai_api_base,
            generation_models,
            generation_timeout,
            generation_max_tokens,
            generation_temperature,
        })
    }

    /// The settings handed to the generation orchestrator.
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            models: self
                .generation_models
                .iter()
                .map(|m| ModelProfile::for_model(m))
                .collect(),
            attempt_timeout: self.generation_timeout,
            max_output_tokens: self.generation_max_tokens,
            temperature: self.generation_temperature,
        }
    }
}

/// Parses a comma-separated, priority-ordered model list.
fn parse_model_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        return Err(ConfigError::InvalidValue(
            "GENERATION_MODELS".to_string(),
            "at least one model is required".to_string(),
        ));
    }
    Ok(models)
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| {
        ConfigError::InvalidValue(var.to_string(), format!("'{}' is not a valid number", raw))
    })
}

/// A zero timeout would fail every attempt before it starts.
fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match parse_number::<u64>("GENERATION_TIMEOUT_SECS", raw)? {
        0 => Err(ConfigError::InvalidValue(
            "GENERATION_TIMEOUT_SECS".to_string(),
            "timeout must be at least one second".to_string(),
        )),
        secs => Ok(Duration::from_secs(secs)),
    }
}
