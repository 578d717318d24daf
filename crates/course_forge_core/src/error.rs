//! crates/course_forge_core/src/error.rs
//!
//! Errors raised while generating course content.

use std::time::Duration;

use crate::ports::PortError;

/// What `generate_course` and `generate_lesson` can return. Model failures are
/// never part of this type: they end in a synthesized fallback instead.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),
    #[error("Generation was cancelled")]
    Cancelled,
}

/// Why a single model attempt did not produce a usable payload.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("transport error: {0}")]
    Transport(#[from] PortError),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed output: {0}")]
    Malformed(String),
}

#[derive(Debug)]
pub struct AttemptFailure {
    pub model: String,
    pub error: AttemptError,
}

/// Every configured model was tried and none produced a valid payload.
#[derive(Debug, thiserror::Error)]
#[error("all {} model attempts failed", .failures.len())]
pub struct ExhaustedError {
    pub failures: Vec<AttemptFailure>,
}
