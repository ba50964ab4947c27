//! Quiz application service: load, submit and best-effort result saving.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use voxlux_core::clock::Clock;
use voxlux_core::error::DomainError;

use crate::domain::attempt::QuizAttempt;
use crate::domain::quiz::{Quiz, QuizRef, QuizScore};
use crate::domain::result::QuizResult;
use crate::domain::store::QuizStore;

/// What the learner sees after submitting. `saved` reports durability and
/// never gates the score.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    /// The computed score.
    pub score: QuizScore,
    /// Whether the result reached the store.
    pub saved: bool,
    /// The result record that was (or would have been) written.
    pub result: QuizResult,
}

/// Orchestrates quiz loading and submission against a [`QuizStore`].
#[derive(Clone)]
pub struct QuizService {
    store: Arc<dyn QuizStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for QuizService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizService").finish_non_exhaustive()
    }
}

impl QuizService {
    /// Creates a service.
    #[must_use]
    pub fn new(store: Arc<dyn QuizStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Loads the quiz of `module_id`. A module without a quiz, or with an
    /// invalid one, yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store is unreachable.
    #[instrument(skip(self))]
    pub async fn load_quiz(&self, module_id: &str) -> Result<Option<Quiz>, DomainError> {
        let Some(quiz) = self.store.quiz_for_module(module_id).await? else {
            return Ok(None);
        };
        Ok(Self::checked(quiz))
    }

    /// Returns the first valid quiz attached to any of `module_ids`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store is unreachable.
    #[instrument(skip(self))]
    pub async fn quiz_for_world(&self, module_ids: &[String]) -> Result<Option<QuizRef>, DomainError> {
        for quiz_ref in self.store.quizzes_for_modules(module_ids).await? {
            let quiz = self.store.quiz_by_id(quiz_ref.quiz_id).await?;
            if quiz.and_then(Self::checked).is_some() {
                return Ok(Some(quiz_ref));
            }
        }
        Ok(None)
    }

    /// Whether `user_id` has a stored passing result for `quiz_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store is unreachable.
    pub async fn has_passing_result(&self, user_id: Uuid, quiz_id: Uuid) -> Result<bool, DomainError> {
        self.store.has_passing_result(user_id, quiz_id).await
    }

    /// Scores `attempt` and saves the result on a best-effort basis.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the attempt was already
    /// submitted. Store failures are logged and reported via
    /// [`SubmissionOutcome::saved`].
    #[instrument(skip(self, attempt), fields(quiz_id = %attempt.quiz().id))]
    pub async fn submit_attempt(
        &self,
        user_id: Uuid,
        attempt: &mut QuizAttempt,
    ) -> Result<SubmissionOutcome, DomainError> {
        let score = attempt.submit()?;
        let result = QuizResult::new(
            user_id,
            attempt.quiz().id,
            score,
            attempt.answers().to_vec(),
            self.clock.now(),
        );

        let saved = match self.store.save_result(&result).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to persist quiz result");
                false
            }
        };
        info!(
            score = score.score_percent,
            passed = score.passed,
            saved,
            "quiz submitted"
        );

        Ok(SubmissionOutcome {
            score,
            saved,
            result,
        })
    }

    /// Submits a complete answer sheet for `quiz_id` in one step.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the quiz does not exist or is
    /// invalid, `DomainError::Validation` if `answers` does not match the
    /// quiz, and `DomainError::Infrastructure` if the quiz cannot be read.
    pub async fn submit_answers(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
        answers: &[Option<usize>],
    ) -> Result<SubmissionOutcome, DomainError> {
        let quiz = self
            .store
            .quiz_by_id(quiz_id)
            .await?
            .and_then(Self::checked)
            .ok_or_else(|| DomainError::NotFound(format!("quiz {quiz_id}")))?;

        if answers.len() != quiz.questions.len() {
            return Err(DomainError::Validation(format!(
                "expected {} answers, got {}",
                quiz.questions.len(),
                answers.len()
            )));
        }

        let mut attempt = QuizAttempt::new(quiz);
        for (question, answer) in answers.iter().enumerate() {
            if let Some(option) = answer {
                attempt.select_for(question, *option)?;
            }
        }
        self.submit_attempt(user_id, &mut attempt).await
    }

    fn checked(quiz: Quiz) -> Option<Quiz> {
        match quiz.validate() {
            Ok(()) => Some(quiz),
            Err(e) => {
                warn!(quiz_id = %quiz.id, error = %e, "ignoring invalid quiz");
                None
            }
        }
    }
}
