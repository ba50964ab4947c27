//! A single live attempt at a quiz.

use voxlux_core::error::DomainError;

use super::quiz::{Quiz, QuizScore};

/// One attempt at a quiz: the selected answer per question, the question
/// being shown and, once submitted, the score.
///
/// Selections survive back/forward navigation. After submission the
/// attempt is frozen until [`QuizAttempt::retake`].
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    quiz: Quiz,
    answers: Vec<Option<usize>>,
    current: usize,
    score: Option<QuizScore>,
}

impl QuizAttempt {
    /// Starts an attempt with every question unanswered.
    #[must_use]
    pub fn new(quiz: Quiz) -> Self {
        let answers = vec![None; quiz.questions.len()];
        Self {
            quiz,
            answers,
            current: 0,
            score: None,
        }
    }

    /// The quiz being attempted.
    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// Selected option per question.
    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    /// Index of the question being shown.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The score, once submitted.
    #[must_use]
    pub fn score(&self) -> Option<QuizScore> {
        self.score
    }

    /// Whether the attempt has been submitted.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.score.is_some()
    }

    /// Selects `option` for the current question.
    ///
    /// # Errors
    ///
    /// See [`QuizAttempt::select_for`].
    pub fn select(&mut self, option: usize) -> Result<(), DomainError> {
        self.select_for(self.current, option)
    }

    /// Selects `option` for `question`, replacing any previous selection.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the attempt was submitted or
    /// either index is out of range.
    pub fn select_for(&mut self, question: usize, option: usize) -> Result<(), DomainError> {
        self.ensure_open()?;
        let q = self.quiz.questions.get(question).ok_or_else(|| {
            DomainError::Validation(format!("question {question} is out of range"))
        })?;
        if option >= q.options.len() {
            return Err(DomainError::Validation(format!(
                "option {option} is out of range for question {question}"
            )));
        }
        self.answers[question] = Some(option);
        Ok(())
    }

    /// Moves to the next question, staying on the last one.
    pub fn next(&mut self) {
        if self.current + 1 < self.quiz.questions.len() {
            self.current += 1;
        }
    }

    /// Moves to the previous question, staying on the first one.
    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Jumps to `question`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `question` is out of range.
    pub fn go_to(&mut self, question: usize) -> Result<(), DomainError> {
        if question >= self.quiz.questions.len() {
            return Err(DomainError::Validation(format!(
                "question {question} is out of range"
            )));
        }
        self.current = question;
        Ok(())
    }

    /// Scores the attempt and freezes it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the attempt was already
    /// submitted.
    pub fn submit(&mut self) -> Result<QuizScore, DomainError> {
        self.ensure_open()?;
        let score = self.quiz.score(&self.answers);
        self.score = Some(score);
        Ok(score)
    }

    /// Clears every answer and the score and returns to the first question.
    pub fn retake(&mut self) {
        self.answers.fill(None);
        self.current = 0;
        self.score = None;
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_submitted() {
            return Err(DomainError::Validation(
                "attempt already submitted; retake to answer again".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quiz::tests::quiz_with;

    #[test]
    fn test_new_attempt_is_unanswered_at_first_question() {
        let attempt = QuizAttempt::new(quiz_with(3, 60));

        assert_eq!(attempt.answers(), &[None, None, None]);
        assert_eq!(attempt.current_index(), 0);
        assert!(!attempt.is_submitted());
    }

    #[test]
    fn test_answers_persist_across_navigation() {
        // Arrange
        let mut attempt = QuizAttempt::new(quiz_with(3, 60));

        // Act
        attempt.select(1).unwrap();
        attempt.next();
        attempt.select(2).unwrap();
        attempt.previous();
        attempt.next();
        attempt.next();

        // Assert
        assert_eq!(attempt.answers(), &[Some(1), Some(2), None]);
        assert_eq!(attempt.current_index(), 2);
    }

    #[test]
    fn test_selection_can_change_until_submit() {
        let mut attempt = QuizAttempt::new(quiz_with(1, 100));

        attempt.select(0).unwrap();
        attempt.select(1).unwrap();
        let score = attempt.submit().unwrap();

        assert!(score.passed);
        assert!(matches!(attempt.select(0), Err(DomainError::Validation(_))));
        assert!(matches!(attempt.submit(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut attempt = QuizAttempt::new(quiz_with(2, 60));

        attempt.previous();
        assert_eq!(attempt.current_index(), 0);
        attempt.next();
        attempt.next();
        assert_eq!(attempt.current_index(), 1);
        assert!(attempt.go_to(2).is_err());
        attempt.go_to(0).unwrap();
        assert_eq!(attempt.current_index(), 0);
    }

    #[test]
    fn test_out_of_range_option_is_rejected() {
        let mut attempt = QuizAttempt::new(quiz_with(1, 60));

        assert!(matches!(attempt.select(3), Err(DomainError::Validation(_))));
        assert!(matches!(
            attempt.select_for(1, 0),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_retake_resets_answers_and_index() {
        // Arrange
        let mut attempt = QuizAttempt::new(quiz_with(3, 100));
        attempt.select(0).unwrap();
        attempt.next();
        attempt.select(1).unwrap();
        attempt.next();
        let failed = attempt.submit().unwrap();
        assert!(!failed.passed);

        // Act
        attempt.retake();

        // Assert
        assert_eq!(attempt.answers(), &[None, None, None]);
        assert_eq!(attempt.current_index(), 0);
        assert!(attempt.score().is_none());
        assert!(attempt.select(1).is_ok());
    }
}
