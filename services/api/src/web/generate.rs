//! services/api/src/web/generate.rs
//!
//! The `/generate-course` endpoint: full course generation and single-lesson
//! regeneration behind one JSON contract.

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use course_forge_core::domain::{Difficulty, GenerationRequest, LessonRegenerationRequest};
use course_forge_core::orchestrator::{Generated, GenerationSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;

pub const GENERATION_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-generation-source");
pub const GENERATION_MODEL_HEADER: HeaderName = HeaderName::from_static("x-generation-model");

//=========================================================================================
// Request Body
//=========================================================================================

/// Body of `POST /generate-course`.
///
/// Every field is optional at the parsing stage: lesson-mode requests carry
/// only `mode` and `context`. Required fields are checked per mode.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCourseBody {
    pub title: Option<String>,
    pub category: Option<String>,
    /// One of `Beginner`, `Intermediate`, `Advanced`.
    pub difficulty: Option<String>,
    pub duration: Option<String>,
    pub learning_objectives: Option<String>,
    pub target_audience: Option<String>,
    pub additional_requirements: Option<String>,
    /// `course` (default) or `lesson`.
    pub mode: Option<String>,
    /// `{ courseTitle, moduleTitle, lessonTitle, difficulty }`, required when `mode` is `lesson`.
    #[schema(value_type = Option<Object>)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationJob {
    Course(GenerationRequest),
    Lesson(LessonRegenerationRequest),
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}

impl GenerateCourseBody {
    /// Resolves the body into the job for its mode, rejecting missing fields.
    pub fn into_job(self) -> Result<GenerationJob, ApiError> {
        match self.mode.as_deref().unwrap_or("course") {
            "course" => {
                let difficulty = required("difficulty", self.difficulty)?
                    .parse::<Difficulty>()
                    .map_err(ApiError::BadRequest)?;
                Ok(GenerationJob::Course(GenerationRequest {
                    title: required("title", self.title)?,
                    category: required("category", self.category)?,
                    difficulty,
                    duration: required("duration", self.duration)?,
                    learning_objectives: required("learningObjectives", self.learning_objectives)?,
                    target_audience: required("targetAudience", self.target_audience)?,
                    additional_requirements: self.additional_requirements,
                }))
            }
            "lesson" => {
                let context = self.context.ok_or_else(|| {
                    ApiError::BadRequest("context is required when mode is lesson".to_string())
                })?;
                let request: LessonRegenerationRequest = serde_json::from_value(context)
                    .map_err(|e| ApiError::BadRequest(format!("invalid lesson context: {}", e)))?;
                Ok(GenerationJob::Lesson(request))
            }
            other => Err(ApiError::BadRequest(format!("unsupported mode '{}'", other))),
        }
    }
}

//=========================================================================================
// Handler
//=========================================================================================

/// Serializes the payload and records where it came from in response headers.
/// The body is identical for model output and fallback content.
pub fn generated_response<T: Serialize>(generated: Generated<T>) -> Response {
    let mut response = Json(generated.payload).into_response();
    let headers = response.headers_mut();
    match generated.source {
        GenerationSource::Model(model) => {
            headers.insert(GENERATION_SOURCE_HEADER, HeaderValue::from_static("model"));
            if let Ok(value) = HeaderValue::from_str(&model) {
                headers.insert(GENERATION_MODEL_HEADER, value);
            }
        }
        GenerationSource::Fallback => {
            headers.insert(GENERATION_SOURCE_HEADER, HeaderValue::from_static("fallback"));
        }
    }
    response
}

/// Generate a course outline, or regenerate a single lesson.
///
/// Model failures never surface here: when every model fails the response
/// carries deterministic fallback content with the same shape.
#[utoipa::path(
    post,
    path = "/generate-course",
    request_body = GenerateCourseBody,
    responses(
        (
            status = 200,
            description = "Course payload `{description, price, tags, outline}` or lesson payload `{content}`"
        ),
        (status = 400, description = "A required field is missing or invalid"),
        (status = 500, description = "The request body could not be parsed")
    )
)]
pub async fn generate_course_handler(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: GenerateCourseBody = serde_json::from_slice(&body)?;
    let job = body.into_job()?;

    // Dropping the handler future (client disconnect) cancels generation.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let response = match job {
        GenerationJob::Course(request) => {
            generated_response(app_state.generator.generate_course(&request, &cancel).await?)
        }
        GenerationJob::Lesson(request) => {
            generated_response(app_state.generator.generate_lesson(&request, &cancel).await?)
        }
    };
    Ok(response)
}
