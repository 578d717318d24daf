//! crates/course_forge_core/src/prompt.rs
//!
//! Renders generation requests into the instruction text sent to the model.
//! Rendering is plain template substitution, so identical requests always
//! produce identical prompts.

use crate::domain::{GenerationRequest, LessonRegenerationRequest};
use crate::error::GenerationError;

pub const SYSTEM_INSTRUCTIONS: &str = "You are an expert course creator and instructional designer. \
Create detailed, structured course content that provides real educational value. \
You must respond with a single valid JSON object and nothing else.";

const COURSE_TEMPLATE: &str = r#"Create a comprehensive course titled "{title}" with these specifications:

- Category: {category}
- Difficulty Level: {difficulty}
- Duration: {duration}
- Learning Objectives: {objectives}
- Target Audience: {audience}
{requirements}
Produce:
- a comprehensive course description,
- a price estimate in US dollars as a plain number,
- between 5 and 7 tags,
- an outline of 6 to 10 modules. Every module has a title, a list of objectives, an estimated time, and 3 to 5 lessons.

Every lesson has a title, a short description, a duration, a list of key concepts, and its full content in markdown. Lesson content must be substantial (at least 300-500 words) with headers, worked examples, and practical guidance.

Respond with ONLY a single JSON object in exactly this shape, with no text before or after it:
{
  "description": "string - comprehensive course description",
  "price": number,
  "tags": ["string", "string"],
  "outline": [
    {
      "moduleTitle": "string",
      "objectives": ["string", "string"],
      "estimatedTime": "string",
      "lessons": [
        {
          "title": "string",
          "description": "string - brief lesson overview",
          "duration": "string",
          "concepts": ["string", "string"],
          "content": "string - detailed lesson content in markdown"
        }
      ]
    }
  ]
}"#;

const LESSON_TEMPLATE: &str = r#"Regenerate the content of the lesson "{lesson}" in the module "{module}" of the course "{course}".

The course difficulty is {difficulty}.

Write ONLY the lesson content, as detailed markdown of at least 300-500 words with examples and practical information. Do not change the lesson title or any other lesson.

Respond with ONLY a single JSON object with exactly one key, with no text before or after it:
{
  "content": "string - detailed lesson content in markdown"
}"#;

/// A system instruction plus the user-turn prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

fn require(field: &str, value: &str) -> Result<(), GenerationError> {
    if value.trim().is_empty() {
        return Err(GenerationError::InvalidRequest(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

pub fn build_course_prompt(request: &GenerationRequest) -> Result<Prompt, GenerationError> {
    require("title", &request.title)?;
    require("category", &request.category)?;
    require("duration", &request.duration)?;
    require("learningObjectives", &request.learning_objectives)?;
    require("targetAudience", &request.target_audience)?;

    let requirements = match request.additional_requirements.as_deref().map(str::trim) {
        Some(extra) if !extra.is_empty() => format!("- Additional Requirements: {}\n", extra),
        _ => String::new(),
    };

    let user = COURSE_TEMPLATE
        .replace("{title}", &request.title)
        .replace("{category}", &request.category)
        .replace("{difficulty}", request.difficulty.as_str())
        .replace("{duration}", &request.duration)
        .replace("{objectives}", &request.learning_objectives)
        .replace("{audience}", &request.target_audience)
        .replace("{requirements}", &requirements);

    Ok(Prompt {
        system: SYSTEM_INSTRUCTIONS.to_string(),
        user,
    })
}

pub fn build_lesson_prompt(request: &LessonRegenerationRequest) -> Result<Prompt, GenerationError> {
    require("courseTitle", &request.course_title)?;
    require("moduleTitle", &request.module_title)?;
    require("lessonTitle", &request.lesson_title)?;

    let user = LESSON_TEMPLATE
        .replace("{lesson}", &request.lesson_title)
        .replace("{module}", &request.module_title)
        .replace("{course}", &request.course_title)
        .replace("{difficulty}", request.difficulty.as_str());

    Ok(Prompt {
        system: SYSTEM_INSTRUCTIONS.to_string(),
        user,
    })
}
