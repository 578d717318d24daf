//! services/api/src/web/router.rs
//!
//! Assembles the HTTP routes, middleware and CORS policy.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::web::generate::{
    generate_course_handler, GENERATION_MODEL_HEADER, GENERATION_SOURCE_HEADER,
};
use crate::web::middleware::require_user;
use crate::web::rest::{
    create_course_handler, delete_course_handler, duplicate_course_handler,
    generate_and_save_course_handler, get_course_handler, list_courses_handler,
    regenerate_lesson_handler, update_course_handler,
};
use crate::web::state::AppState;

/// Builds the API router. Every response, including preflight answers,
/// carries permissive CORS headers.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([GENERATION_SOURCE_HEADER, GENERATION_MODEL_HEADER]);

    // Public routes (no caller identity required)
    let public_routes = Router::new().route("/generate-course", post(generate_course_handler));

    // Course routes (x-user-id required)
    let course_routes = Router::new()
        .route("/courses", get(list_courses_handler).post(create_course_handler))
        .route("/courses/generate", post(generate_and_save_course_handler))
        .route(
            "/courses/{id}",
            get(get_course_handler)
                .put(update_course_handler)
                .delete(delete_course_handler),
        )
        .route("/courses/{id}/duplicate", post(duplicate_course_handler))
        .route(
            "/courses/{id}/modules/{module}/lessons/{lesson}/regenerate",
            post(regenerate_lesson_handler),
        )
        .layer(axum_middleware::from_fn(require_user));

    Router::new()
        .merge(public_routes)
        .merge(course_routes)
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryCourseRepository;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use course_forge_core::models::{CompletionRequest, GenerationSettings};
    use course_forge_core::orchestrator::GenerationOrchestrator;
    use course_forge_core::ports::{CompletionService, PortError, PortResult};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use tokio::sync::Mutex;
    use tower::ServiceExt;
    use uuid::Uuid;

    /// Replays canned provider replies; an exhausted script behaves like a
    /// provider outage.
    struct ScriptedCompletions {
        replies: Mutex<VecDeque<PortResult<String>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedCompletions {
        fn new(replies: Vec<PortResult<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Self::new(vec![])
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletions {
        async fn complete(&self, _request: &CompletionRequest) -> PortResult<String> {
            *self.calls.lock().await += 1;
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(PortError::Unexpected("provider unavailable".to_string())))
        }
    }

    fn app(completions: Arc<ScriptedCompletions>) -> Router {
        let state = Arc::new(AppState {
            courses: Arc::new(InMemoryCourseRepository::new()),
            generator: Arc::new(GenerationOrchestrator::new(
                completions,
                GenerationSettings::default(),
            )),
        });
        build_router(state)
    }

    fn testing_body() -> Value {
        json!({
            "title": "Intro to Testing",
            "category": "QA",
            "difficulty": "Beginner",
            "duration": "2 weeks",
            "learningObjectives": "Learn unit testing. Learn integration testing.",
            "targetAudience": "junior engineers"
        })
    }

    fn json_request(method: Method, uri: &str, user: Option<Uuid>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("origin", "https://example.com")
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn generate_course_returns_model_payload() {
        let model_reply = json!({
            "description": "Great course",
            "price": 120,
            "tags": ["qa", "testing", "unit", "integration", "tdd"],
            "outline": [{
                "moduleTitle": "Unit Tests",
                "objectives": ["Write a test"],
                "estimatedTime": "2 hours",
                "lessons": [{
                    "title": "First test",
                    "description": "d",
                    "duration": "20 minutes",
                    "concepts": ["assert"],
                    "content": "# Hi"
                }]
            }]
        });
        let completions = ScriptedCompletions::new(vec![Ok(model_reply.to_string())]);
        let response = app(completions.clone())
            .oneshot(json_request(Method::POST, "/generate-course", None, testing_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-generation-source"], "model");
        assert_eq!(response.headers()["x-generation-model"], "gpt-4o");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body = read_json(response).await;
        assert_eq!(body["outline"][0]["moduleTitle"], "Unit Tests");
        assert_eq!(body["price"], 120.0);
        assert_eq!(*completions.calls.lock().await, 1);
    }

    #[tokio::test]
    async fn generate_course_serves_fallback_when_all_models_fail() {
        let completions = ScriptedCompletions::failing();
        let response = app(completions.clone())
            .oneshot(json_request(Method::POST, "/generate-course", None, testing_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-generation-source"], "fallback");
        let body = read_json(response).await;
        assert_eq!(body["outline"][0]["moduleTitle"], "Introduction");
        assert_eq!(body["outline"][0]["lessons"].as_array().unwrap().len(), 2);
        assert_eq!(body["tags"], json!(["qa", "beginner"]));
        assert_eq!(body["price"], 99.0);
        assert_eq!(*completions.calls.lock().await, 3);
    }

    #[tokio::test]
    async fn lesson_mode_fallback_mentions_every_title() {
        let body = json!({
            "mode": "lesson",
            "context": {
                "courseTitle": "X",
                "moduleTitle": "Y",
                "lessonTitle": "Z",
                "difficulty": "Advanced"
            }
        });
        let response = app(ScriptedCompletions::failing())
            .oneshot(json_request(Method::POST, "/generate-course", None, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        let content = body["content"].as_str().unwrap();
        assert!(content.contains('X') && content.contains('Y') && content.contains('Z'));
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_a_500_with_error_message() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/generate-course")
            .header("origin", "https://example.com")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(ScriptedCompletions::failing()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body = read_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Failed to parse request body"));
    }

    #[tokio::test]
    async fn missing_required_field_is_a_400() {
        let mut body = testing_body();
        body.as_object_mut().unwrap().remove("targetAudience");
        let completions = ScriptedCompletions::failing();
        let response = app(completions.clone())
            .oneshot(json_request(Method::POST, "/generate-course", None, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(*completions.calls.lock().await, 0);
    }

    #[tokio::test]
    async fn preflight_is_answered_with_permissive_headers() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/generate-course")
            .header("origin", "https://example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type,authorization")
            .body(Body::empty())
            .unwrap();
        let response = app(ScriptedCompletions::failing()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(response.headers().contains_key("access-control-allow-methods"));
        assert!(response.headers().contains_key("access-control-allow-headers"));
    }

    #[tokio::test]
    async fn course_body_errors_are_json_400s() {
        let app = app(ScriptedCompletions::failing());
        let user = Uuid::new_v4();

        let mut request = json_request(Method::POST, "/courses", Some(user), json!({}));
        *request.body_mut() = Body::from("{not json");
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(read_json(response).await["error"].is_string());

        // Wrong shape: difficulty is not one of the known levels.
        let mut body = testing_body();
        body["difficulty"] = json!("Expert");
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/courses/generate", Some(user), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(read_json(response).await["error"].is_string());

        let draft = json!({
            "title": "T",
            "category": "C",
            "difficulty": "Beginner",
            "price": "cheap"
        });
        let response = app
            .oneshot(json_request(Method::POST, "/courses", Some(user), draft))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert!(read_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn course_routes_require_a_user() {
        let response = app(ScriptedCompletions::failing())
            .oneshot(json_request(Method::GET, "/courses", None, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn generated_course_can_be_saved_edited_and_regenerated() {
        let lesson_reply = json!({ "content": "Fresh lesson content. ".repeat(5) }).to_string();
        // Course generation fails over to the fallback; the lesson regeneration
        // then succeeds on the first model.
        let completions = ScriptedCompletions::new(vec![
            Err(PortError::Unexpected("down".to_string())),
            Err(PortError::Unexpected("down".to_string())),
            Err(PortError::Unexpected("down".to_string())),
            Ok(lesson_reply),
        ]);
        let app = app(completions);
        let user = Uuid::new_v4();

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/courses/generate", Some(user), testing_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-generation-source"], "fallback");
        let course = read_json(response).await;
        assert_eq!(course["status"], "Draft");
        assert_eq!(course["isAiGenerated"], true);
        let id = course["id"].as_str().unwrap().to_string();
        let untouched = course["outline"][0]["lessons"][0]["content"].clone();

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/courses/{}/modules/0/lessons/1/regenerate", id),
                Some(user),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-generation-source"], "model");
        let course = read_json(response).await;
        let lessons = &course["outline"][0]["lessons"];
        assert!(lessons[1]["content"].as_str().unwrap().starts_with("Fresh lesson content."));
        assert_eq!(lessons[0]["content"], untouched);

        let mut edited = course.clone();
        edited["title"] = json!("Testing 101");
        let response = app
            .clone()
            .oneshot(json_request(Method::PUT, &format!("/courses/{}", id), Some(user), edited))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["title"], "Testing 101");

        let response = app
            .clone()
            .oneshot(json_request(Method::GET, "/courses", Some(user), json!({})))
            .await
            .unwrap();
        assert_eq!(read_json(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn regenerating_a_missing_lesson_is_a_404() {
        let app = app(ScriptedCompletions::failing());
        let user = Uuid::new_v4();
        let draft = json!({ "title": "T", "category": "C", "difficulty": "Beginner" });
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/courses", Some(user), draft))
            .await
            .unwrap();
        let id = read_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(json_request(
                Method::POST,
                &format!("/courses/{}/modules/0/lessons/0/regenerate", id),
                Some(user),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn free_plan_stops_at_three_courses() {
        let app = app(ScriptedCompletions::failing());
        let user = Uuid::new_v4();
        let draft = json!({ "title": "T", "category": "C", "difficulty": "Beginner" });

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(json_request(Method::POST, "/courses", Some(user), draft.clone()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/courses", Some(user), draft.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let mut request = json_request(Method::POST, "/courses", Some(user), draft);
        request
            .headers_mut()
            .insert("x-user-plan", "basic".parse().unwrap());
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn duplicate_and_delete_round_out_the_lifecycle() {
        let app = app(ScriptedCompletions::failing());
        let user = Uuid::new_v4();
        let draft = json!({
            "title": "Physics",
            "category": "Science",
            "difficulty": "Advanced",
            "status": "Published"
        });
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/courses", Some(user), draft))
            .await
            .unwrap();
        let id = read_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/courses/{}/duplicate", id),
                Some(user),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let copy = read_json(response).await;
        assert_eq!(copy["title"], "Physics (Copy)");
        assert_eq!(copy["status"], "Draft");

        let response = app
            .clone()
            .oneshot(json_request(
                Method::DELETE,
                &format!("/courses/{}", id),
                Some(user),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(json_request(
                Method::GET,
                &format!("/courses/{}", id),
                Some(Uuid::new_v4()),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
