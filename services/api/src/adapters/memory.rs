//! services/api/src/adapters/memory.rs
//!
//! A process-local `CourseRepository`, used when no database is configured.

use async_trait::async_trait;
use chrono::Utc;
use course_forge_core::domain::{Course, CourseDraft};
use course_forge_core::ports::{CourseRepository, PortError, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: RwLock<HashMap<Uuid, Course>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(course_id: Uuid) -> PortError {
    PortError::NotFound(format!("Course {} not found", course_id))
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create_course(
        &self,
        user_id: Uuid,
        draft: &CourseDraft,
        limit: usize,
    ) -> PortResult<Course> {
        let mut courses = self.courses.write().await;
        if courses.values().filter(|c| c.user_id == user_id).count() >= limit {
            return Err(PortError::LimitReached(limit));
        }

        let now = Utc::now();
        let draft = draft.clone();
        let course = Course {
            id: Uuid::new_v4(),
            user_id,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            difficulty: draft.difficulty,
            duration: draft.duration,
            price: draft.price,
            status: draft.status,
            tags: draft.tags,
            thumbnail: draft.thumbnail,
            outline: draft.outline,
            is_ai_generated: draft.is_ai_generated,
            created_at: now,
            updated_at: now,
        };
        courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn get_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Course> {
        self.courses
            .read()
            .await
            .get(&course_id)
            .filter(|c| c.user_id == user_id)
            .cloned()
            .ok_or_else(|| not_found(course_id))
    }

    async fn update_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        draft: &CourseDraft,
    ) -> PortResult<Course> {
        let mut courses = self.courses.write().await;
        let course = courses
            .get_mut(&course_id)
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| not_found(course_id))?;

        let draft = draft.clone();
        course.title = draft.title;
        course.description = draft.description;
        course.category = draft.category;
        course.difficulty = draft.difficulty;
        course.duration = draft.duration;
        course.price = draft.price;
        course.status = draft.status;
        course.tags = draft.tags;
        course.thumbnail = draft.thumbnail;
        course.outline = draft.outline;
        course.is_ai_generated = draft.is_ai_generated;
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn delete_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<()> {
        let mut courses = self.courses.write().await;
        match courses.get(&course_id) {
            Some(c) if c.user_id == user_id => {
                courses.remove(&course_id);
                Ok(())
            }
            _ => Err(not_found(course_id)),
        }
    }

    async fn list_courses(&self, user_id: Uuid) -> PortResult<Vec<Course>> {
        let mut courses: Vec<Course> = self
            .courses
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn count_courses(&self, user_id: Uuid) -> PortResult<usize> {
        Ok(self
            .courses
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .count())
    }
}
