//! crates/course_forge_core/src/models.rs
//!
//! The model priority list, the per-model capability table, and the outbound
//! request each attempt sends.

use std::time::Duration;

use crate::prompt::Prompt;

/// Default priority order: high-capability first, then cheaper, then an
/// alternative family.
pub const DEFAULT_MODELS: [&str; 3] = ["gpt-4o", "gpt-4o-mini", "gpt-4.1-2025-04-14"];

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(90);

/// Models pinned to the newer request shape by exact identifier.
const COMPLETION_TOKEN_MODELS: &[&str] = &["gpt-4.1-2025-04-14"];

/// Families that take `max_completion_tokens` and reject `temperature`.
const COMPLETION_TOKEN_PREFIXES: &[&str] = &["o1", "o3", "o4", "gpt-5"];

//=========================================================================================
// Capability Table
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProfile {
    pub id: String,
    /// Sends `max_completion_tokens` instead of `max_tokens`.
    pub uses_completion_token_limit: bool,
    pub supports_temperature: bool,
}

impl ModelProfile {
    /// Resolves a model identifier against the static capability table.
    pub fn for_model(id: &str) -> Self {
        let id = id.trim();
        let newer = COMPLETION_TOKEN_MODELS.contains(&id)
            || COMPLETION_TOKEN_PREFIXES.iter().any(|p| id.starts_with(p));

        Self {
            id: id.to_string(),
            uses_completion_token_limit: newer,
            supports_temperature: !newer,
        }
    }
}

//=========================================================================================
// Generation Settings
//=========================================================================================

/// Everything the orchestrator needs from configuration, passed in explicitly.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub models: Vec<ModelProfile>,
    pub attempt_timeout: Duration,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl GenerationSettings {
    pub fn with_models<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            models: models
                .into_iter()
                .map(|m| ModelProfile::for_model(m.as_ref()))
                .collect(),
            ..Self::default()
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODELS.iter().map(|m| ModelProfile::for_model(m)).collect(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

//=========================================================================================
// Outbound Request
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLimit {
    MaxTokens(u32),
    MaxCompletionTokens(u32),
}

/// A provider-neutral chat completion request, already shaped for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub token_limit: TokenLimit,
    pub temperature: Option<f32>,
    /// Ask the provider to constrain output to a single JSON object.
    pub json_object: bool,
}

impl CompletionRequest {
    pub fn shape(profile: &ModelProfile, prompt: &Prompt, settings: &GenerationSettings) -> Self {
        let token_limit = if profile.uses_completion_token_limit {
            TokenLimit::MaxCompletionTokens(settings.max_output_tokens)
        } else {
            TokenLimit::MaxTokens(settings.max_output_tokens)
        };

        Self {
            model: profile.id.clone(),
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            token_limit,
            temperature: profile.supports_temperature.then_some(settings.temperature),
            json_object: true,
        }
    }
}
