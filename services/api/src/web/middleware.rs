//! services/api/src/web/middleware.rs
//!
//! Caller identification for the course routes.

use axum::{extract::Request, middleware::Next, response::Response};
use course_forge_core::domain::UserPlan;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::CurrentUser;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_PLAN_HEADER: &str = "x-user-plan";

/// Middleware that reads the caller's id and plan from request headers.
///
/// A missing or malformed `x-user-id` means nobody is signed in and the
/// request is rejected with 401. A missing plan defaults to `free`.
pub async fn require_user(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or(ApiError::Unauthorized)?;

    let plan = match req.headers().get(USER_PLAN_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| ApiError::BadRequest("x-user-plan must be ASCII".to_string()))?
            .parse::<UserPlan>()
            .map_err(ApiError::BadRequest)?,
        None => UserPlan::default(),
    };

    debug!(%user_id, ?plan, "Identified caller");
    req.extensions_mut().insert(CurrentUser { user_id, plan });

    Ok(next.run(req).await)
}
