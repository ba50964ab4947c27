//! Infrastructure adapters.
//!
//! `PostgreSQL` implementations of the domain store traits, and the JSON
//! file that backs the process-wide flags.

pub mod file_flag_backend;
pub mod pg_course_store;
pub mod pg_event_repository;
pub mod pg_quiz_store;

pub use file_flag_backend::FileFlagBackend;
pub use pg_course_store::PgCourseStore;
pub use pg_event_repository::PgEventRepository;
pub use pg_quiz_store::PgQuizStore;

use voxlux_core::error::DomainError;

/// Maps a driver error onto the domain's infrastructure failure.
pub(crate) fn db_error(context: &str, error: &sqlx::Error) -> DomainError {
    DomainError::infrastructure(context, error)
}
