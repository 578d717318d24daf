//! crates/course_forge_core/src/fallback.rs
//!
//! Model-free payloads served when every generation attempt has failed.
//! Both functions are pure: the same input always yields the same output.

use crate::domain::{
    CourseLesson, CourseModule, Difficulty, GeneratedCoursePayload, GeneratedLessonPayload,
    GenerationRequest, LessonRegenerationRequest,
};

pub const FALLBACK_PRICE: f64 = 99.0;

/// Splits free-text objectives on periods into a markdown bullet list.
fn objectives_as_bullets(objectives: &str) -> String {
    objectives
        .split('.')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| format!("- {}", o))
        .collect::<Vec<_>>()
        .join("\n")
}

fn prerequisites(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Beginner => {
            "No prior experience is needed. We start from first principles and build up step by step."
        }
        Difficulty::Intermediate => {
            "Some familiarity with the subject helps, but we revisit the fundamentals wherever they matter."
        }
        Difficulty::Advanced => {
            "This course assumes a working knowledge of the fundamentals and moves quickly past them."
        }
    }
}

fn getting_started_content(request: &GenerationRequest) -> String {
    let starting_point = match request.difficulty {
        Difficulty::Beginner => "no prior knowledge",
        _ => "your current level",
    };

    format!(
        "# Getting Started with {title}

Welcome to {title}! This first lesson sets out what the course covers and how to get the most from it.

## What You'll Learn

This course was put together for {audience} and works toward these objectives:

{objectives}

## How the Course Is Structured

You will move from {starting_point} to confident practice through:

- **Worked examples** that make each idea concrete
- **Exercises** that turn concepts into skills
- **Gradual progression** where every lesson builds on the last
- **Real-world scenarios** that show where the material applies

## Prerequisites

{prerequisites}

## Making the Most of It

1. **Practice as you go** rather than only reading
2. **Keep notes** on the ideas that surprise you
3. **Finish the exercises** before moving on
4. **Revisit earlier lessons** when something is unclear
5. **Apply the material** to a project of your own

Let's get started.",
        title = request.title,
        audience = request.target_audience,
        objectives = objectives_as_bullets(&request.learning_objectives),
        starting_point = starting_point,
        prerequisites = prerequisites(request.difficulty),
    )
}

fn core_concepts_content(request: &GenerationRequest) -> String {
    format!(
        "# Core Concepts

This lesson introduces the ideas everything else in {title} rests on.

## Key Principles

### Build a Solid Foundation
Experts are beginners who kept going. A firm grasp of the basics makes every later topic easier.

### Learn Progressively
Master one concept before stacking the next on top of it.

### Practice Deliberately
Theory sticks once you apply it. Each principle here is paired with something to try.

## Shared Vocabulary

- **Core concept**: an idea the rest of the course depends on
- **Best practice**: an approach that reliably leads to good results
- **Application**: putting a concept to work on a real problem

## Why This Matters

A clear picture of these fundamentals helps you:
- make better decisions as the material gets harder
- avoid the most common mistakes
- explain your reasoning to others

## Next Up

With these concepts in place you are ready to dig into the specific techniques of {title}.",
        title = request.title,
    )
}

/// The single-module course served when no model produced a valid outline.
pub fn fallback_course(request: &GenerationRequest) -> GeneratedCoursePayload {
    let lessons = vec![
        CourseLesson {
            title: "Getting Started".to_string(),
            description: "An introduction to the course material and how to approach it"
                .to_string(),
            duration: "30 minutes".to_string(),
            concepts: vec![
                "Overview".to_string(),
                "Prerequisites".to_string(),
                "Course structure".to_string(),
            ],
            content: Some(getting_started_content(request)),
        },
        CourseLesson {
            title: "Core Concepts".to_string(),
            description: "The fundamental principles of the subject".to_string(),
            duration: "45 minutes".to_string(),
            concepts: vec![
                "Key principles".to_string(),
                "Foundation knowledge".to_string(),
                "Best practices".to_string(),
            ],
            content: Some(core_concepts_content(request)),
        },
    ];

    GeneratedCoursePayload {
        description: format!(
            "A comprehensive {} course designed for {}. {}",
            request.title, request.target_audience, request.learning_objectives
        ),
        price: FALLBACK_PRICE,
        tags: vec![
            request.category.to_lowercase(),
            request.difficulty.as_str().to_lowercase(),
        ],
        outline: vec![CourseModule {
            module_title: "Introduction".to_string(),
            objectives: vec![
                "Course overview".to_string(),
                "Setting expectations".to_string(),
                "Understanding the fundamentals".to_string(),
            ],
            estimated_time: "2 hours".to_string(),
            lessons,
        }],
    }
}

/// Generic lesson content served when no model produced usable content.
pub fn fallback_lesson(request: &LessonRegenerationRequest) -> GeneratedLessonPayload {
    let content = format!(
        "# {lesson}

This lesson covers {lesson}, part of the {module} module of {course}.

## Overview

We will look at the key ideas behind {lesson} and how they are applied in practice at the {difficulty} level.

## Key Learning Points

- Fundamental concepts and principles
- Real-world applications and examples
- Best practices and common approaches
- Practical exercises

## Content

[Detailed content for this lesson has not been generated yet. Regenerate the lesson to replace this placeholder.]

This lesson builds on what came before in {module} and prepares you for the topics that follow.",
        lesson = request.lesson_title,
        module = request.module_title,
        course = request.course_title,
        difficulty = request.difficulty.as_str().to_lowercase(),
    );

    GeneratedLessonPayload { content }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MIN_LESSON_CONTENT_CHARS;

    fn testing_request() -> GenerationRequest {
        GenerationRequest {
            title: "Intro to Testing".to_string(),
            category: "QA".to_string(),
            difficulty: Difficulty::Beginner,
            duration: "2 weeks".to_string(),
            learning_objectives: "Learn unit testing. Learn integration testing.".to_string(),
            target_audience: "junior engineers".to_string(),
            additional_requirements: None,
        }
    }

    #[test]
    fn fallback_course_has_one_introduction_module() {
        let payload = fallback_course(&testing_request());
        assert_eq!(payload.price, 99.0);
        assert_eq!(payload.tags, vec!["qa", "beginner"]);
        assert_eq!(payload.outline.len(), 1);
        assert_eq!(payload.outline[0].module_title, "Introduction");
        let titles: Vec<_> = payload.outline[0].lessons.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["Getting Started", "Core Concepts"]);
    }

    #[test]
    fn description_joins_title_audience_and_objectives() {
        let payload = fallback_course(&testing_request());
        assert_eq!(
            payload.description,
            "A comprehensive Intro to Testing course designed for junior engineers. \
             Learn unit testing. Learn integration testing."
        );
    }

    #[test]
    fn objectives_render_as_bullets() {
        let payload = fallback_course(&testing_request());
        let content = payload.outline[0].lessons[0].content.as_deref().unwrap();
        assert!(content.contains("- Learn unit testing\n- Learn integration testing"));
        assert!(content.contains("from no prior knowledge"));
        assert!(content.contains("No prior experience is needed"));
    }

    #[test]
    fn fallback_course_is_deterministic() {
        let first = serde_json::to_string(&fallback_course(&testing_request())).unwrap();
        let second = serde_json::to_string(&fallback_course(&testing_request())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_lesson_mentions_all_titles() {
        let payload = fallback_lesson(&LessonRegenerationRequest {
            course_title: "X".to_string(),
            module_title: "Y".to_string(),
            lesson_title: "Z".to_string(),
            difficulty: Difficulty::Advanced,
        });
        assert!(payload.content.contains("# Z"));
        assert!(payload.content.contains("Y module"));
        assert!(payload.content.contains("of X."));
        assert!(payload.content.contains("## Overview"));
        assert!(payload.content.contains("## Key Learning Points"));
        assert!(payload.content.encode_utf16().count() >= MIN_LESSON_CONTENT_CHARS);
    }
}
