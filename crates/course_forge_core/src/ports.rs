//! crates/course_forge_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the model provider and the storage backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, CourseDraft};
use crate::models::CompletionRequest;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Course limit of {0} reached for the current plan")]
    LimitReached(usize),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one chat-completion request and returns the raw text of the first
    /// choice. Non-2xx responses and empty choices are errors.
    async fn complete(&self, request: &CompletionRequest) -> PortResult<String>;
}

/// Save/load contract for courses. Every operation is scoped to the owner.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Stores a new course unless the owner already has `limit` courses. The
    /// count and the insert happen atomically per owner.
    async fn create_course(
        &self,
        user_id: Uuid,
        draft: &CourseDraft,
        limit: usize,
    ) -> PortResult<Course>;

    async fn get_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Course>;

    async fn update_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        draft: &CourseDraft,
    ) -> PortResult<Course>;

    async fn delete_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<()>;

    /// Newest first.
    async fn list_courses(&self, user_id: Uuid) -> PortResult<Vec<Course>>;

    async fn count_courses(&self, user_id: Uuid) -> PortResult<usize>;
}
