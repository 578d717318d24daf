//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the course REST endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use course_forge_core::domain::{CourseDraft, GenerationRequest};
use course_forge_core::ports::PortError;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::generate::{self, generated_response, GenerateCourseBody};
use crate::web::state::{AppState, CurrentUser};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate::generate_course_handler,
        list_courses_handler,
        create_course_handler,
        generate_and_save_course_handler,
        get_course_handler,
        update_course_handler,
        delete_course_handler,
        duplicate_course_handler,
        regenerate_lesson_handler,
    ),
    components(
        schemas(GenerateCourseBody)
    ),
    tags(
        (name = "Course Forge API", description = "Generate, edit and store AI-assisted courses.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Helpers
//=========================================================================================

/// Parses a JSON body. Syntax and shape errors are the caller's fault and
/// answer 400 `{ "error": string }`.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

/// Rejects the request early once the caller's plan has no room for another
/// course. The store enforces the limit again when the course is inserted.
async fn ensure_capacity(app_state: &AppState, user: &CurrentUser) -> Result<(), ApiError> {
    let existing = app_state.courses.count_courses(user.user_id).await?;
    if !user.plan.can_create_course(existing) {
        return Err(PortError::LimitReached(user.plan.course_limit()).into());
    }
    Ok(())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the caller's courses, newest first.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "The caller's courses"),
        (status = 401, description = "Missing or invalid x-user-id header")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn list_courses_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let courses = app_state.courses.list_courses(user.user_id).await?;
    Ok(Json(courses))
}

/// Save a new course.
#[utoipa::path(
    post,
    path = "/courses",
    request_body(content_type = "application/json", description = "The course to store."),
    responses(
        (status = 201, description = "Course created"),
        (status = 400, description = "Invalid course"),
        (status = 403, description = "Plan course limit reached")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user."),
        ("x-user-plan" = Option<String>, Header, description = "free, basic, premium or lifetime.")
    )
)]
pub async fn create_course_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let draft: CourseDraft = parse_body(&body)?;
    draft.validate().map_err(ApiError::BadRequest)?;

    let course = app_state
        .courses
        .create_course(user.user_id, &draft, user.plan.course_limit())
        .await?;
    info!(course_id = %course.id, user_id = %user.user_id, "Course created");
    Ok((StatusCode::CREATED, Json(course)))
}

/// Generate a course and store it as a draft in one step.
#[utoipa::path(
    post,
    path = "/courses/generate",
    request_body(
        content_type = "application/json",
        description = "Course metadata, as for /generate-course in course mode."
    ),
    responses(
        (status = 201, description = "Generated course stored as a draft"),
        (status = 400, description = "A required field is missing"),
        (status = 403, description = "Plan course limit reached")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user."),
        ("x-user-plan" = Option<String>, Header, description = "free, basic, premium or lifetime.")
    )
)]
pub async fn generate_and_save_course_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: GenerationRequest = parse_body(&body)?;
    ensure_capacity(&app_state, &user).await?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let generated = app_state.generator.generate_course(&request, &cancel).await?;

    let draft = CourseDraft::from_generation(&request, generated.payload);
    let course = app_state
        .courses
        .create_course(user.user_id, &draft, user.plan.course_limit())
        .await?;
    info!(course_id = %course.id, source = ?generated.source, "Generated course stored");

    let mut response = generated_response(course_forge_core::Generated {
        payload: course,
        source: generated.source,
    });
    *response.status_mut() = StatusCode::CREATED;
    Ok(response)
}

/// Fetch one course.
#[utoipa::path(
    get,
    path = "/courses/{id}",
    responses(
        (status = 200, description = "The course"),
        (status = 404, description = "No such course for this user")
    ),
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn get_course_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let course = app_state.courses.get_course(user.user_id, course_id).await?;
    Ok(Json(course))
}

/// Replace a course's editable fields.
#[utoipa::path(
    put,
    path = "/courses/{id}",
    request_body(content_type = "application/json", description = "The full edited course."),
    responses(
        (status = 200, description = "Updated course"),
        (status = 400, description = "Invalid course"),
        (status = 404, description = "No such course for this user")
    ),
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn update_course_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let draft: CourseDraft = parse_body(&body)?;
    draft.validate().map_err(ApiError::BadRequest)?;
    let course = app_state
        .courses
        .update_course(user.user_id, course_id, &draft)
        .await?;
    Ok(Json(course))
}

/// Delete a course.
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such course for this user")
    ),
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn delete_course_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.courses.delete_course(user.user_id, course_id).await?;
    info!(%course_id, user_id = %user.user_id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Copy a course as a new draft titled "<title> (Copy)".
#[utoipa::path(
    post,
    path = "/courses/{id}/duplicate",
    responses(
        (status = 201, description = "The new copy"),
        (status = 403, description = "Plan course limit reached"),
        (status = 404, description = "No such course for this user")
    ),
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user."),
        ("x-user-plan" = Option<String>, Header, description = "free, basic, premium or lifetime.")
    )
)]
pub async fn duplicate_course_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let original = app_state.courses.get_course(user.user_id, course_id).await?;
    let copy = app_state
        .courses
        .create_course(
            user.user_id,
            &original.duplicate_draft(),
            user.plan.course_limit(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Regenerate one lesson's content and store it, leaving every other lesson untouched.
#[utoipa::path(
    post,
    path = "/courses/{id}/modules/{module}/lessons/{lesson}/regenerate",
    responses(
        (status = 200, description = "The course with the regenerated lesson"),
        (status = 404, description = "No such course, module or lesson")
    ),
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("module" = usize, Path, description = "Zero-based module index"),
        ("lesson" = usize, Path, description = "Zero-based lesson index within the module"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn regenerate_lesson_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((course_id, module_index, lesson_index)): Path<(Uuid, usize, usize)>,
) -> Result<Response, ApiError> {
    let mut course = app_state.courses.get_course(user.user_id, course_id).await?;
    let context = course
        .lesson_context(module_index, lesson_index)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Lesson {} of module {} not found",
                lesson_index, module_index
            ))
        })?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let generated = app_state.generator.generate_lesson(&context, &cancel).await?;

    course.apply_lesson_content(module_index, lesson_index, &generated.payload.content);
    let course = app_state
        .courses
        .update_course(user.user_id, course_id, &course.to_draft())
        .await?;

    Ok(generated_response(course_forge_core::Generated {
        payload: course,
        source: generated.source,
    }))
}
