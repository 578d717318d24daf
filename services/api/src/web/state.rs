//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-request caller identity.

use course_forge_core::domain::UserPlan;
use course_forge_core::orchestrator::GenerationOrchestrator;
use course_forge_core::ports::CourseRepository;
use std::sync::Arc;
use uuid::Uuid;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<dyn CourseRepository>,
    pub generator: Arc<GenerationOrchestrator>,
}

/// The signed-in caller, inserted into request extensions by `require_user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub plan: UserPlan,
}
