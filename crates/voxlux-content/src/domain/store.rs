//! Backend module/lesson store abstraction.

use async_trait::async_trait;
use voxlux_core::error::DomainError;

use super::course::Course;

/// Read-only access to the authoritative course records.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Fetches a course with its masterminds and lessons, or `None` if the
    /// backend has no record for `course_id`.
    async fn fetch_course(&self, course_id: &str) -> Result<Option<Course>, DomainError>;
}
