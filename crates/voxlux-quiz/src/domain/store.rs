//! Quiz store abstraction.

use async_trait::async_trait;
use uuid::Uuid;
use voxlux_core::error::DomainError;

use super::quiz::{Quiz, QuizRef};
use super::result::QuizResult;

/// Backend holding quiz definitions and attempt results.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Returns the quiz attached to `module_id`, if any.
    async fn quiz_for_module(&self, module_id: &str) -> Result<Option<Quiz>, DomainError>;

    /// Returns a quiz by id, if it exists.
    async fn quiz_by_id(&self, quiz_id: Uuid) -> Result<Option<Quiz>, DomainError>;

    /// Lists the quizzes attached to any of `module_ids`.
    async fn quizzes_for_modules(&self, module_ids: &[String])
    -> Result<Vec<QuizRef>, DomainError>;

    /// Persists an attempt result.
    async fn save_result(&self, result: &QuizResult) -> Result<(), DomainError>;

    /// Whether `user_id` has at least one passing result for `quiz_id`.
    async fn has_passing_result(&self, user_id: Uuid, quiz_id: Uuid) -> Result<bool, DomainError>;
}
