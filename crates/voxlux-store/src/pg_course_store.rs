//! `PostgreSQL` implementation of the `CourseStore` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use tracing::{debug, instrument};
use voxlux_content::domain::course::{Course, Lesson, Mastermind};
use voxlux_content::domain::store::CourseStore;
use voxlux_core::error::DomainError;

use crate::db_error;

/// Reads courses, masterminds and lessons from `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCourseStore {
    pool: PgPool,
}

impl PgCourseStore {
    /// Creates a new `PgCourseStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CourseRow {
    id: String,
    title: String,
    description: String,
}

#[derive(sqlx::FromRow)]
struct MastermindRow {
    id: String,
    title: String,
    subtitle: Option<String>,
}

#[derive(sqlx::FromRow)]
struct LessonRow {
    id: String,
    mastermind_id: String,
    title: Option<String>,
    description: Option<String>,
    media_type: String,
    duration: Option<String>,
    output_label: Option<String>,
    order_index: Option<i32>,
    video_url: Option<String>,
    resources: serde_json::Value,
    slot: Option<String>,
}

/// Decodes a snake_case enum column through its serde representation.
fn decode_enum<T: DeserializeOwned>(column: &str, value: String) -> Result<T, DomainError> {
    serde_json::from_value(serde_json::Value::String(value))
        .map_err(|e| DomainError::Infrastructure(format!("invalid {column}: {e}")))
}

impl TryFrom<LessonRow> for Lesson {
    type Error = DomainError;

    fn try_from(row: LessonRow) -> Result<Self, Self::Error> {
        let resources = serde_json::from_value(row.resources).map_err(|e| {
            DomainError::Infrastructure(format!("invalid resources for lesson {}: {e}", row.id))
        })?;
        Ok(Self {
            media_type: decode_enum("media_type", row.media_type)?,
            slot: row.slot.map(|s| decode_enum("slot", s)).transpose()?,
            id: row.id,
            title: row.title,
            description: row.description,
            duration: row.duration,
            output_label: row.output_label,
            order_index: row.order_index,
            video_url: row.video_url,
            resources,
        })
    }
}

#[async_trait]
impl CourseStore for PgCourseStore {
    #[instrument(skip(self))]
    async fn fetch_course(&self, course_id: &str) -> Result<Option<Course>, DomainError> {
        let Some(course) = sqlx::query_as::<_, CourseRow>(
            "SELECT id, title, description FROM courses WHERE id = $1",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("loading course", &e))?
        else {
            return Ok(None);
        };

        let masterminds: Vec<MastermindRow> = sqlx::query_as(
            "SELECT id, title, subtitle FROM masterminds WHERE course_id = $1 ORDER BY position",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("loading masterminds", &e))?;

        let lessons: Vec<LessonRow> = sqlx::query_as(
            "SELECT l.id, l.mastermind_id, l.title, l.description, l.media_type, l.duration, \
                    l.output_label, l.order_index, l.video_url, l.resources, l.slot \
             FROM lessons l JOIN masterminds m ON m.id = l.mastermind_id \
             WHERE m.course_id = $1 ORDER BY m.position, l.position",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("loading lessons", &e))?;

        let mut by_mastermind: HashMap<String, Vec<Lesson>> = HashMap::new();
        for row in lessons {
            let mastermind_id = row.mastermind_id.clone();
            by_mastermind
                .entry(mastermind_id)
                .or_default()
                .push(Lesson::try_from(row)?);
        }

        let masterminds: Vec<Mastermind> = masterminds
            .into_iter()
            .map(|m| Mastermind {
                lessons: by_mastermind.remove(&m.id).unwrap_or_default(),
                id: m.id,
                title: m.title,
                subtitle: m.subtitle,
            })
            .collect();

        debug!(worlds = masterminds.len(), "course loaded");
        Ok(Some(Course {
            id: course.id,
            title: course.title,
            description: course.description,
            masterminds,
        }))
    }
}
