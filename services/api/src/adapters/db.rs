//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CourseRepository` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_forge_core::domain::{Course, CourseDraft, CourseModule};
use course_forge_core::ports::{CourseRepository, PortError, PortResult};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

const COURSE_COLUMNS: &str = "id, user_id, title, description, category, difficulty, duration, \
     price, status, tags, thumbnail, outline, is_ai_generated, created_at, updated_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CourseRepository` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CourseRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    category: String,
    difficulty: String,
    duration: String,
    price: f64,
    status: String,
    tags: Vec<String>,
    thumbnail: Option<String>,
    outline: Json<Vec<CourseModule>>,
    is_ai_generated: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CourseRecord {
    fn to_domain(self) -> PortResult<Course> {
        Ok(Course {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            category: self.category,
            difficulty: self.difficulty.parse().map_err(PortError::Unexpected)?,
            duration: self.duration,
            price: self.price,
            status: self.status.parse().map_err(PortError::Unexpected)?,
            tags: self.tags,
            thumbnail: self.thumbnail,
            outline: self.outline.0,
            is_ai_generated: self.is_ai_generated,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn not_found_or_unexpected(course_id: Uuid) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("Course {} not found", course_id)),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `CourseRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl CourseRepository for DbAdapter {
    async fn create_course(
        &self,
        user_id: Uuid,
        draft: &CourseDraft,
        limit: usize,
    ) -> PortResult<Course> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Serializes creates per owner until the transaction ends.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if existing as usize >= limit {
            return Err(PortError::LimitReached(limit));
        }

        let query = format!(
            "INSERT INTO courses (id, user_id, title, description, category, difficulty, duration, \
             price, status, tags, thumbnail, outline, is_ai_generated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {}",
            COURSE_COLUMNS
        );
        let record = sqlx::query_as::<_, CourseRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.category)
            .bind(draft.difficulty.as_str())
            .bind(&draft.duration)
            .bind(draft.price)
            .bind(draft.status.as_str())
            .bind(&draft.tags)
            .bind(&draft.thumbnail)
            .bind(Json(&draft.outline))
            .bind(draft.is_ai_generated)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        record.to_domain()
    }

    async fn get_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Course> {
        let query = format!(
            "SELECT {} FROM courses WHERE id = $1 AND user_id = $2",
            COURSE_COLUMNS
        );
        let record = sqlx::query_as::<_, CourseRecord>(&query)
            .bind(course_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(course_id))?;
        record.to_domain()
    }

    async fn update_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        draft: &CourseDraft,
    ) -> PortResult<Course> {
        let query = format!(
            "UPDATE courses SET title = $3, description = $4, category = $5, difficulty = $6, \
             duration = $7, price = $8, status = $9, tags = $10, thumbnail = $11, outline = $12, \
             is_ai_generated = $13, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            COURSE_COLUMNS
        );
        let record = sqlx::query_as::<_, CourseRecord>(&query)
            .bind(course_id)
            .bind(user_id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.category)
            .bind(draft.difficulty.as_str())
            .bind(&draft.duration)
            .bind(draft.price)
            .bind(draft.status.as_str())
            .bind(&draft.tags)
            .bind(&draft.thumbnail)
            .bind(Json(&draft.outline))
            .bind(draft.is_ai_generated)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(course_id))?;
        record.to_domain()
    }

    async fn delete_course(&self, user_id: Uuid, course_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1 AND user_id = $2")
            .bind(course_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Course {} not found", course_id)));
        }
        Ok(())
    }

    async fn list_courses(&self, user_id: Uuid) -> PortResult<Vec<Course>> {
        let query = format!(
            "SELECT {} FROM courses WHERE user_id = $1 ORDER BY created_at DESC",
            COURSE_COLUMNS
        );
        let records = sqlx::query_as::<_, CourseRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn count_courses(&self, user_id: Uuid) -> PortResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(count as usize)
    }
}
