//! Test quiz stores: `QuizStore` implementations and fixtures.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;
use voxlux_core::error::DomainError;
use voxlux_quiz::domain::quiz::{Question, Quiz, QuizOption, QuizRef};
use voxlux_quiz::domain::result::QuizResult;
use voxlux_quiz::domain::store::QuizStore;

/// Builds a valid quiz for `module_id` with `questions` questions whose
/// correct option is always index 0.
#[must_use]
pub fn sample_quiz(module_id: &str, questions: usize, passing_score: u8) -> Quiz {
    Quiz {
        id: Uuid::new_v4(),
        module_id: module_id.to_owned(),
        title: format!("Quiz for {module_id}"),
        passing_score,
        questions: (0..questions)
            .map(|i| Question {
                prompt: format!("Question {i}"),
                options: vec![
                    QuizOption {
                        text: "correct".to_owned(),
                        correct: true,
                    },
                    QuizOption {
                        text: "incorrect".to_owned(),
                        correct: false,
                    },
                ],
                points: 1,
            })
            .collect(),
    }
}

/// A quiz store backed by vectors. Saves can be made to fail.
#[derive(Debug, Default)]
pub struct InMemoryQuizStore {
    quizzes: Vec<Quiz>,
    results: Mutex<Vec<QuizResult>>,
    fail_saves: bool,
}

impl InMemoryQuizStore {
    /// Creates a store serving `quizzes`.
    #[must_use]
    pub fn new(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes,
            ..Self::default()
        }
    }

    /// Creates a store serving `quizzes` whose `save_result` always fails.
    #[must_use]
    pub fn with_failing_saves(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes,
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Seeds a stored result.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_result(&self, result: QuizResult) {
        self.results.lock().unwrap().push(result);
    }

    /// Returns every saved result.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn results(&self) -> Vec<QuizResult> {
        self.results.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuizStore for InMemoryQuizStore {
    async fn quiz_for_module(&self, module_id: &str) -> Result<Option<Quiz>, DomainError> {
        Ok(self.quizzes.iter().find(|q| q.module_id == module_id).cloned())
    }

    async fn quiz_by_id(&self, quiz_id: Uuid) -> Result<Option<Quiz>, DomainError> {
        Ok(self.quizzes.iter().find(|q| q.id == quiz_id).cloned())
    }

    async fn quizzes_for_modules(
        &self,
        module_ids: &[String],
    ) -> Result<Vec<QuizRef>, DomainError> {
        Ok(self
            .quizzes
            .iter()
            .filter(|q| module_ids.contains(&q.module_id))
            .map(|q| QuizRef {
                quiz_id: q.id,
                module_id: q.module_id.clone(),
            })
            .collect())
    }

    async fn save_result(&self, result: &QuizResult) -> Result<(), DomainError> {
        if self.fail_saves {
            return Err(DomainError::Infrastructure("write rejected".into()));
        }
        self.push_result(result.clone());
        Ok(())
    }

    async fn has_passing_result(&self, user_id: Uuid, quiz_id: Uuid) -> Result<bool, DomainError> {
        Ok(self
            .results
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.user_id == user_id && r.quiz_id == quiz_id && r.passed))
    }
}

/// A quiz store that is always unreachable.
#[derive(Debug)]
pub struct FailingQuizStore;

#[async_trait]
impl QuizStore for FailingQuizStore {
    async fn quiz_for_module(&self, _module_id: &str) -> Result<Option<Quiz>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn quiz_by_id(&self, _quiz_id: Uuid) -> Result<Option<Quiz>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn quizzes_for_modules(
        &self,
        _module_ids: &[String],
    ) -> Result<Vec<QuizRef>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save_result(&self, _result: &QuizResult) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn has_passing_result(
        &self,
        _user_id: Uuid,
        _quiz_id: Uuid,
    ) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
