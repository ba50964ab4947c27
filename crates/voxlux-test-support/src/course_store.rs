//! Test course stores: `CourseStore` implementations and fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;
use voxlux_content::domain::course::{Course, Lesson, Mastermind};
use voxlux_content::domain::store::CourseStore;
use voxlux_core::error::DomainError;

/// Builds a course `course_id` with `worlds` masterminds of `lessons`
/// lessons each. Mastermind ids are `{course_id}-mm-{n}`, lesson ids
/// `{course_id}-w{n}-l{i}`, and every lesson carries `order_index = i`.
#[must_use]
pub fn sample_course(course_id: &str, worlds: u32, lessons: u32) -> Course {
    Course {
        id: course_id.to_owned(),
        title: format!("Course {course_id}"),
        description: String::new(),
        masterminds: (1..=worlds)
            .map(|n| Mastermind {
                id: format!("{course_id}-mm-{n}"),
                title: format!("World {n}"),
                subtitle: None,
                lessons: (0..lessons)
                    .map(|i| {
                        let mut lesson = Lesson::new(format!("{course_id}-w{n}-l{i}"));
                        lesson.title = Some(format!("Remote lesson {n}.{i}"));
                        lesson.order_index = i32::try_from(i).ok();
                        lesson
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// A course store serving a fixed set of courses.
#[derive(Debug, Default)]
pub struct InMemoryCourseStore {
    courses: Vec<Course>,
}

impl InMemoryCourseStore {
    /// Creates a store serving `courses`.
    #[must_use]
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn fetch_course(&self, course_id: &str) -> Result<Option<Course>, DomainError> {
        Ok(self.courses.iter().find(|c| c.id == course_id).cloned())
    }
}

/// A course store that is always unreachable.
#[derive(Debug)]
pub struct FailingCourseStore;

#[async_trait]
impl CourseStore for FailingCourseStore {
    async fn fetch_course(&self, _course_id: &str) -> Result<Option<Course>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A course store whose fetches block until [`GatedCourseStore::release`]
/// is called. Used to hold a fetch in flight across an unmount.
#[derive(Debug)]
pub struct GatedCourseStore {
    inner: InMemoryCourseStore,
    gate: watch::Sender<bool>,
    calls: AtomicUsize,
}

impl GatedCourseStore {
    /// Creates a closed gate in front of `courses`.
    #[must_use]
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            inner: InMemoryCourseStore::new(courses),
            gate: watch::Sender::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Lets every pending and future fetch complete.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Number of fetches started so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CourseStore for GatedCourseStore {
    async fn fetch_course(&self, course_id: &str) -> Result<Option<Course>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rx = self.gate.subscribe();
        rx.wait_for(|open| *open)
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        self.inner.fetch_course(course_id).await
    }
}
