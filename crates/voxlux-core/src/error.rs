//! Errors shared by every context.

use std::fmt::Display;

use thiserror::Error;
use uuid::Uuid;

/// Failure of a domain operation.
///
/// Absent content and absent quizzes are not errors; lookups for those
/// return `Option`. `NotFound` is for things a caller must already know
/// about, such as a mounted world session or a quiz being submitted.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The referenced resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The event stream moved on since it was loaded.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// Stream id.
        aggregate_id: Uuid,
        /// Version the writer loaded.
        expected: i64,
        /// Version found at write time.
        actual: i64,
    },

    /// Input rejected before anything was changed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A backend was unreachable, rejected a write, or returned a payload
    /// that could not be decoded.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// An `Infrastructure` error prefixed with what was being attempted.
    pub fn infrastructure(context: &str, cause: impl Display) -> Self {
        Self::Infrastructure(format!("{context}: {cause}"))
    }
}
