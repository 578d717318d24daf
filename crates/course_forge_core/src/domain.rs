//! crates/course_forge_core/src/domain.rs
//!
//! Defines the core data structures for course generation and storage.
//! Field names serialize in camelCase, which is the shape both the model
//! output and the browser client use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Enumerations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beginner" => Ok(Difficulty::Beginner),
            "Intermediate" => Ok(Difficulty::Intermediate),
            "Advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Publication state of a stored course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "Draft",
            CourseStatus::Published => "Published",
            CourseStatus::Archived => "Archived",
        }
    }
}

impl FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(CourseStatus::Draft),
            "Published" => Ok(CourseStatus::Published),
            "Archived" => Ok(CourseStatus::Archived),
            other => Err(format!("unknown course status '{}'", other)),
        }
    }
}

/// Subscription tier, which caps how many courses a user may keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserPlan {
    #[default]
    Free,
    Basic,
    Premium,
    Lifetime,
}

impl UserPlan {
    pub fn course_limit(&self) -> usize {
        match self {
            UserPlan::Free => 3,
            UserPlan::Basic => 10,
            UserPlan::Premium => 50,
            UserPlan::Lifetime => 999,
        }
    }

    pub fn can_create_course(&self, existing_courses: usize) -> bool {
        existing_courses < self.course_limit()
    }
}

impl FromStr for UserPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(UserPlan::Free),
            "basic" => Ok(UserPlan::Basic),
            "premium" => Ok(UserPlan::Premium),
            "lifetime" => Ok(UserPlan::Lifetime),
            other => Err(format!("unknown plan '{}'", other)),
        }
    }
}

//=========================================================================================
// Course Structure
//=========================================================================================

/// The smallest content unit of a course.
///
/// Every field defaults when absent so that partially filled client edits
/// still deserialize.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseLesson {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub concepts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A named unit of the outline. A module with no lessons is accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseModule {
    pub module_title: String,
    pub objectives: Vec<String>,
    pub estimated_time: String,
    pub lessons: Vec<CourseLesson>,
}

//=========================================================================================
// Generation Requests and Payloads
//=========================================================================================

/// Course metadata collected from the user for a full generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration: String,
    pub learning_objectives: String,
    pub target_audience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_requirements: Option<String>,
}

/// Context for regenerating a single lesson without touching its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRegenerationRequest {
    pub course_title: String,
    pub module_title: String,
    pub lesson_title: String,
    pub difficulty: Difficulty,
}

/// Result of a course-mode generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCoursePayload {
    pub description: String,
    pub price: f64,
    pub tags: Vec<String>,
    pub outline: Vec<CourseModule>,
}

/// Result of a lesson-mode generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLessonPayload {
    pub content: String,
}

//=========================================================================================
// Stored Courses
//=========================================================================================

/// A course owned by a user, as persisted by a `CourseRepository`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration: String,
    pub price: f64,
    pub status: CourseStatus,
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
    pub outline: Vec<CourseModule>,
    pub is_ai_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The writable part of a course, used for create and replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub outline: Vec<CourseModule>,
    #[serde(default)]
    pub is_ai_generated: bool,
}

impl CourseDraft {
    /// Builds a draft course from the request that drove generation and the
    /// payload it produced.
    pub fn from_generation(request: &GenerationRequest, payload: GeneratedCoursePayload) -> Self {
        Self {
            title: request.title.clone(),
            description: payload.description,
            category: request.category.clone(),
            difficulty: request.difficulty,
            duration: request.duration.clone(),
            price: payload.price,
            status: CourseStatus::Draft,
            tags: payload.tags,
            thumbnail: None,
            outline: payload.outline,
            is_ai_generated: true,
        }
    }

    /// Checks the fields a stored course cannot do without.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("category must not be empty".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("price must be a non-negative number".to_string());
        }
        Ok(())
    }
}

impl Course {
    /// A copy of this course, renamed and reset to Draft.
    pub fn duplicate_draft(&self) -> CourseDraft {
        CourseDraft {
            title: format!("{} (Copy)", self.title),
            status: CourseStatus::Draft,
            ..self.to_draft()
        }
    }

    pub fn to_draft(&self) -> CourseDraft {
        CourseDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty,
            duration: self.duration.clone(),
            price: self.price,
            status: self.status,
            tags: self.tags.clone(),
            thumbnail: self.thumbnail.clone(),
            outline: self.outline.clone(),
            is_ai_generated: self.is_ai_generated,
        }
    }

    /// The context needed to regenerate one lesson of this course.
    pub fn lesson_context(
        &self,
        module_index: usize,
        lesson_index: usize,
    ) -> Option<LessonRegenerationRequest> {
        let module = self.outline.get(module_index)?;
        let lesson = module.lessons.get(lesson_index)?;
        Some(LessonRegenerationRequest {
            course_title: self.title.clone(),
            module_title: module.module_title.clone(),
            lesson_title: lesson.title.clone(),
            difficulty: self.difficulty,
        })
    }

    /// Replaces the content of a single lesson, leaving every other lesson as
    /// it was. Blank content keeps the previous text.
    ///
    /// Returns `false` when either index is out of range.
    pub fn apply_lesson_content(
        &mut self,
        module_index: usize,
        lesson_index: usize,
        content: &str,
    ) -> bool {
        let Some(lesson) = self
            .outline
            .get_mut(module_index)
            .and_then(|m| m.lessons.get_mut(lesson_index))
        else {
            return false;
        };

        if !content.trim().is_empty() {
            lesson.content = Some(content.to_string());
        }
        true
    }
}
