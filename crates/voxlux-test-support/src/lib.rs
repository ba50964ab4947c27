//! Shared test doubles and fixtures for the Vox Lux learning core.

mod clock;
mod course_store;
mod flags;
mod quiz_store;
mod repository;

pub use clock::FixedClock;
pub use course_store::{FailingCourseStore, GatedCourseStore, InMemoryCourseStore, sample_course};
pub use flags::InMemoryFlagBackend;
pub use quiz_store::{FailingQuizStore, InMemoryQuizStore, sample_quiz};
pub use repository::{
    EmptyEventRepository, FailingEventRepository, InMemoryEventRepository,
    RecordingEventRepository,
};
