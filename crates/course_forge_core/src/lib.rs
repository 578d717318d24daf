pub mod domain;
pub mod error;
pub mod fallback;
pub mod models;
pub mod orchestrator;
pub mod ports;
pub mod prompt;
pub mod validation;

pub use domain::{
    Course, CourseDraft, CourseLesson, CourseModule, CourseStatus, Difficulty,
    GeneratedCoursePayload, GeneratedLessonPayload, GenerationRequest, LessonRegenerationRequest,
    UserPlan,
};
pub use error::{AttemptError, ExhaustedError, GenerationError};
pub use models::{CompletionRequest, GenerationSettings, ModelProfile, TokenLimit};
pub use orchestrator::{Generated, GenerationOrchestrator, GenerationSource};
pub use ports::{CompletionService, CourseRepository, PortError, PortResult};
