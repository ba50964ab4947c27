//! Quiz definitions and scoring.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voxlux_core::error::DomainError;

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    /// Option text.
    pub text: String,
    /// Whether this is the correct option.
    #[serde(default)]
    pub correct: bool,
}

/// A question with ordered options, exactly one of them correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question prompt.
    pub prompt: String,
    /// Options, in display order.
    pub options: Vec<QuizOption>,
    /// Points value. Displayed only; scoring is unweighted.
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_points() -> u32 {
    1
}

impl Question {
    /// Index of the correct option, if exactly one is marked.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        let mut correct = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.correct)
            .map(|(i, _)| i);
        match (correct.next(), correct.next()) {
            (Some(index), None) => Some(index),
            _ => None,
        }
    }
}

/// A quiz attached to a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Quiz identifier.
    pub id: Uuid,
    /// The module (lesson) this quiz belongs to.
    pub module_id: String,
    /// Title.
    pub title: String,
    /// Minimum score, in percent, required to pass.
    pub passing_score: u8,
    /// Questions, in order.
    pub questions: Vec<Question>,
}

/// The outcome of scoring a set of answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    /// round(100 * correct / total), 0 for an empty quiz.
    pub score_percent: u8,
    /// `score_percent >= passing_score` on a non-empty quiz.
    pub passed: bool,
    /// Number of correct answers.
    pub correct: usize,
    /// Number of questions.
    pub total: usize,
}

impl Quiz {
    /// Checks the quiz is answerable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the quiz has no questions, a
    /// question does not have exactly one correct option, or the passing
    /// score exceeds 100.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.passing_score > 100 {
            return Err(DomainError::Validation(format!(
                "quiz {} has passing score {} above 100",
                self.id, self.passing_score
            )));
        }
        if self.questions.is_empty() {
            return Err(DomainError::Validation(format!(
                "quiz {} has no questions",
                self.id
            )));
        }
        for (index, question) in self.questions.iter().enumerate() {
            if question.correct_index().is_none() {
                return Err(DomainError::Validation(format!(
                    "question {index} of quiz {} must have exactly one correct option",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Scores `answers` (one optional option index per question).
    /// Unanswered and out-of-range answers count as wrong.
    #[must_use]
    pub fn score(&self, answers: &[Option<usize>]) -> QuizScore {
        let total = self.questions.len();
        let correct = self
            .questions
            .iter()
            .zip(answers)
            .filter(|(q, a)| a.is_some() && q.correct_index() == **a)
            .count();

        if total == 0 {
            return QuizScore {
                score_percent: 0,
                passed: false,
                correct: 0,
                total: 0,
            };
        }

        // Round half up in integer arithmetic.
        let percent = (200 * correct + total) / (2 * total);
        let score_percent = u8::try_from(percent).unwrap_or(100);
        QuizScore {
            score_percent,
            passed: score_percent >= self.passing_score,
            correct,
            total,
        }
    }

    /// Returns the quiz without correctness markers.
    #[must_use]
    pub fn to_public(&self) -> PublicQuiz {
        PublicQuiz {
            id: self.id,
            module_id: self.module_id.clone(),
            title: self.title.clone(),
            passing_score: self.passing_score,
            questions: self
                .questions
                .iter()
                .map(|q| PublicQuestion {
                    prompt: q.prompt.clone(),
                    options: q.options.iter().map(|o| o.text.clone()).collect(),
                    points: q.points,
                })
                .collect(),
        }
    }
}

/// A quiz as shown to learners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuiz {
    /// Quiz identifier.
    pub id: Uuid,
    /// Owning module.
    pub module_id: String,
    /// Title.
    pub title: String,
    /// Passing threshold in percent.
    pub passing_score: u8,
    /// Questions without correctness markers.
    pub questions: Vec<PublicQuestion>,
}

/// A question as shown to learners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuestion {
    /// Prompt.
    pub prompt: String,
    /// Option texts, in order.
    pub options: Vec<String>,
    /// Points value.
    pub points: u32,
}

/// Associates a quiz with its module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRef {
    /// Quiz identifier.
    pub quiz_id: Uuid,
    /// Owning module.
    pub module_id: String,
}
