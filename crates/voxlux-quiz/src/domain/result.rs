//! Persisted quiz results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::quiz::QuizScore;

/// The record written when an attempt is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Result identifier.
    pub id: Uuid,
    /// The learner.
    pub user_id: Uuid,
    /// The quiz.
    pub quiz_id: Uuid,
    /// Score in percent.
    pub score_percent: u8,
    /// Pass flag derived from the quiz's threshold.
    pub passed: bool,
    /// Selected option per question, as submitted.
    pub answers: Vec<Option<usize>>,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

impl QuizResult {
    /// Builds a result from a scored attempt.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        quiz_id: Uuid,
        score: QuizScore,
        answers: Vec<Option<usize>>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            quiz_id,
            score_percent: score.score_percent,
            passed: score.passed,
            answers,
            submitted_at,
        }
    }
}
