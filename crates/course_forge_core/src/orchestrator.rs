//! crates/course_forge_core/src/orchestrator.rs
//!
//! Runs a prompt against the configured models in priority order and returns
//! the first structurally valid payload. When every model fails, the
//! deterministic fallback payload is returned instead of an error.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{
    GeneratedCoursePayload, GeneratedLessonPayload, GenerationRequest, LessonRegenerationRequest,
};
use crate::error::{AttemptError, AttemptFailure, ExhaustedError, GenerationError};
use crate::fallback::{fallback_course, fallback_lesson};
use crate::models::{CompletionRequest, GenerationSettings};
use crate::ports::CompletionService;
use crate::prompt::{build_course_prompt, build_lesson_prompt, Prompt};
use crate::validation::{parse_model_output, validate_course, validate_lesson, Validation};

/// Where a returned payload came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationSource {
    Model(String),
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub payload: T,
    pub source: GenerationSource,
}

/// Outcome of the attempt loop before fallback synthesis.
enum ChainError {
    Exhausted(ExhaustedError),
    Cancelled,
}

pub struct GenerationOrchestrator {
    completions: Arc<dyn CompletionService>,
    settings: GenerationSettings,
}

impl GenerationOrchestrator {
    pub fn new(completions: Arc<dyn CompletionService>, settings: GenerationSettings) -> Self {
        Self {
            completions,
            settings,
        }
    }

    /// Generates a full course. Never fails because of the models: exhaustion
    /// is absorbed into `fallback_course`.
    pub async fn generate_course(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<Generated<GeneratedCoursePayload>, GenerationError> {
        let prompt = build_course_prompt(request)?;
        info!(title = %request.title, difficulty = %request.difficulty, "Generating course");

        match self.run_chain(&prompt, validate_course, cancel).await {
            Ok(generated) => Ok(generated),
            Err(ChainError::Cancelled) => Err(GenerationError::Cancelled),
            Err(ChainError::Exhausted(e)) => {
                warn!(error = %e, title = %request.title, "Serving fallback course");
                Ok(Generated {
                    payload: fallback_course(request),
                    source: GenerationSource::Fallback,
                })
            }
        }
    }

    /// Regenerates the content of one lesson, falling back to generic content.
    pub async fn generate_lesson(
        &self,
        request: &LessonRegenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<Generated<GeneratedLessonPayload>, GenerationError> {
        let prompt = build_lesson_prompt(request)?;
        info!(
            lesson = %request.lesson_title,
            module = %request.module_title,
            "Regenerating lesson"
        );

        match self.run_chain(&prompt, validate_lesson, cancel).await {
            Ok(generated) => Ok(generated),
            Err(ChainError::Cancelled) => Err(GenerationError::Cancelled),
            Err(ChainError::Exhausted(e)) => {
                warn!(error = %e, lesson = %request.lesson_title, "Serving fallback lesson");
                Ok(Generated {
                    payload: fallback_lesson(request),
                    source: GenerationSource::Fallback,
                })
            }
        }
    }

    /// Tries each model strictly in order. The first attempt that both returns
    /// and validates wins; later models are never called.
    async fn run_chain<T>(
        &self,
        prompt: &Prompt,
        validate: fn(Value) -> Validation<T>,
        cancel: &CancellationToken,
    ) -> Result<Generated<T>, ChainError> {
        let mut failures = Vec::with_capacity(self.settings.models.len());

        for (attempt, profile) in self.settings.models.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ChainError::Cancelled);
            }

            let request = CompletionRequest::shape(profile, prompt, &self.settings);
            debug!(model = %profile.id, attempt, "Attempting generation");

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(ChainError::Cancelled),
                outcome = self.attempt(&request, validate) => outcome,
            };

            match outcome {
                Ok(payload) => {
                    info!(model = %profile.id, attempt, "Generation succeeded");
                    return Ok(Generated {
                        payload,
                        source: GenerationSource::Model(profile.id.clone()),
                    });
                }
                Err(error) => {
                    warn!(
                        model = %profile.id,
                        attempt,
                        reason = %error,
                        "Generation attempt failed"
                    );
                    failures.push(AttemptFailure {
                        model: profile.id.clone(),
                        error,
                    });
                }
            }
        }

        Err(ChainError::Exhausted(ExhaustedError { failures }))
    }

    async fn attempt<T>(
        &self,
        request: &CompletionRequest,
        validate: fn(Value) -> Validation<T>,
    ) -> Result<T, AttemptError> {
        let timeout = self.settings.attempt_timeout;
        let raw = tokio::time::timeout(timeout, self.completions.complete(request))
            .await
            .map_err(|_| AttemptError::Timeout(timeout))??;

        let value = parse_model_output(&raw).map_err(AttemptError::Malformed)?;
        match validate(value) {
            Validation::Valid(payload) => Ok(payload),
            Validation::Invalid(reason) => Err(AttemptError::Malformed(reason)),
        }
    }
}
