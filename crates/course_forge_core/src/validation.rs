//! crates/course_forge_core/src/validation.rs
//!
//! Normalizes raw model text into JSON and decides whether it is structurally
//! usable. A failed check is a signal for the orchestrator to move on to the
//! next model, never an error for the caller.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::{CourseLesson, CourseModule, GeneratedCoursePayload, GeneratedLessonPayload};

/// Minimum length of regenerated lesson content, in UTF-16 code units so that
/// text is measured the way browser clients measure it.
pub const MIN_LESSON_CONTENT_CHARS: usize = 50;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*\n(.*?)\n?```$").expect("code fence pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(String),
}

/// Trims the text and strips one surrounding markdown code fence, then parses
/// what is left as JSON.
pub fn parse_model_output(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str());

    serde_json::from_str(body).map_err(|e| format!("response is not valid JSON: {}", e))
}

/// A course payload is valid when `outline` is a non-empty array. Other
/// top-level fields fall back to empty values; modules with no lessons pass.
pub fn validate_course(value: Value) -> Validation<GeneratedCoursePayload> {
    let Value::Object(object) = &value else {
        return Validation::Invalid("response is not a JSON object".to_string());
    };

    let outline = match object.get("outline") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        Some(Value::Array(_)) => return Validation::Invalid("outline is empty".to_string()),
        Some(_) => return Validation::Invalid("outline is not an array".to_string()),
        None => return Validation::Invalid("outline is missing".to_string()),
    };

    let outline = outline.iter().map(module_from_value).collect();
    let description = text_field(&value, "description");

    let price = object
        .get("price")
        .and_then(Value::as_f64)
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0);

    let tags = string_list(object.get("tags"));

    Validation::Valid(GeneratedCoursePayload {
        description,
        price,
        tags,
        outline,
    })
}

//=========================================================================================
// Lenient Outline Reading
//=========================================================================================

// Model output is loosely shaped. Wrong-typed or null fields read as empty
// values instead of failing the whole outline.

fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn lesson_from_value(value: &Value) -> CourseLesson {
    CourseLesson {
        title: text_field(value, "title"),
        description: text_field(value, "description"),
        duration: text_field(value, "duration"),
        concepts: string_list(value.get("concepts")),
        content: value.get("content").and_then(Value::as_str).map(str::to_string),
    }
}

fn module_from_value(value: &Value) -> CourseModule {
    CourseModule {
        module_title: text_field(value, "moduleTitle"),
        objectives: string_list(value.get("objectives")),
        estimated_time: text_field(value, "estimatedTime"),
        lessons: value
            .get("lessons")
            .and_then(Value::as_array)
            .map(|lessons| lessons.iter().map(lesson_from_value).collect())
            .unwrap_or_default(),
    }
}

/// A lesson payload is valid when `content` is a string of at least
/// `MIN_LESSON_CONTENT_CHARS` UTF-16 code units.
pub fn validate_lesson(value: Value) -> Validation<GeneratedLessonPayload> {
    match value.get("content") {
        Some(Value::String(content)) => {
            let length = content.encode_utf16().count();
            if length >= MIN_LESSON_CONTENT_CHARS {
                Validation::Valid(GeneratedLessonPayload {
                    content: content.clone(),
                })
            } else {
                Validation::Invalid(format!(
                    "content has {} characters, need at least {}",
                    length, MIN_LESSON_CONTENT_CHARS
                ))
            }
        }
        Some(_) => Validation::Invalid("content is not a string".to_string()),
        None => Validation::Invalid("content is missing".to_string()),
    }
}
