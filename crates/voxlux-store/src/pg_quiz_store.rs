//! `PostgreSQL` implementation of the `QuizStore` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;
use voxlux_core::error::DomainError;
use voxlux_quiz::domain::quiz::{Quiz, QuizRef};
use voxlux_quiz::domain::result::QuizResult;
use voxlux_quiz::domain::store::QuizStore;

use crate::db_error;

/// Quiz definitions and attempt results in `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    /// Creates a new `PgQuizStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct QuizRow {
    id: Uuid,
    module_id: String,
    title: String,
    passing_score: i16,
    questions: serde_json::Value,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = DomainError;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        let passing_score = u8::try_from(row.passing_score).map_err(|_| {
            DomainError::Infrastructure(format!(
                "quiz {} has passing score {} out of range",
                row.id, row.passing_score
            ))
        })?;
        let questions = serde_json::from_value(row.questions).map_err(|e| {
            DomainError::Infrastructure(format!("invalid questions for quiz {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            module_id: row.module_id,
            title: row.title,
            passing_score,
            questions,
        })
    }
}

const QUIZ_COLUMNS: &str = "id, module_id, title, passing_score, questions";

#[async_trait]
impl QuizStore for PgQuizStore {
    #[instrument(skip(self))]
    async fn quiz_for_module(&self, module_id: &str) -> Result<Option<Quiz>, DomainError> {
        let row: Option<QuizRow> = sqlx::query_as(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE module_id = $1"
        ))
        .bind(module_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("loading quiz", &e))?;
        row.map(Quiz::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn quiz_by_id(&self, quiz_id: Uuid) -> Result<Option<Quiz>, DomainError> {
        let row: Option<QuizRow> =
            sqlx::query_as(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
                .bind(quiz_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("loading quiz", &e))?;
        row.map(Quiz::try_from).transpose()
    }

    #[instrument(skip(self, module_ids), fields(modules = module_ids.len()))]
    async fn quizzes_for_modules(
        &self,
        module_ids: &[String],
    ) -> Result<Vec<QuizRef>, DomainError> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT id, module_id FROM quizzes WHERE module_id = ANY($1) ORDER BY module_id",
        )
        .bind(module_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing quizzes", &e))?;

        Ok(rows
            .into_iter()
            .map(|(quiz_id, module_id)| QuizRef { quiz_id, module_id })
            .collect())
    }

    #[instrument(skip(self, result), fields(quiz_id = %result.quiz_id, user_id = %result.user_id))]
    async fn save_result(&self, result: &QuizResult) -> Result<(), DomainError> {
        let answers = serde_json::to_value(&result.answers)
            .map_err(|e| DomainError::infrastructure("encoding answers", e))?;
        sqlx::query(
            "INSERT INTO quiz_results \
                (id, user_id, quiz_id, score_percent, passed, answers, submitted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(result.id)
        .bind(result.user_id)
        .bind(result.quiz_id)
        .bind(i16::from(result.score_percent))
        .bind(result.passed)
        .bind(answers)
        .bind(result.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("saving quiz result", &e))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn has_passing_result(&self, user_id: Uuid, quiz_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM quiz_results \
             WHERE user_id = $1 AND quiz_id = $2 AND passed)",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("checking quiz results", &e))
    }
}
