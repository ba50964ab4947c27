//! Diploma / completion gate.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use voxlux_content::domain::store::CourseStore;
use voxlux_content::domain::track::TrackMap;
use voxlux_content::registry::ContentRegistry;
use voxlux_core::error::DomainError;
use voxlux_core::repository::EventRepository;
use voxlux_quiz::domain::store::QuizStore;

use crate::application::query_handlers::{completion_percent, get_progress};

/// Diploma eligibility for one learner and course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    /// Both conditions hold.
    pub eligible: bool,
    /// Every required lesson is completed.
    pub lessons_complete: bool,
    /// Every quiz of the course has a passing result.
    pub quizzes_complete: bool,
    /// Lesson completion, in percent.
    pub progress_percent: u8,
    /// The evaluation failed and the result was closed.
    pub degraded: bool,
}

impl Eligibility {
    /// The fail-closed result.
    #[must_use]
    pub fn not_eligible() -> Self {
        Self {
            eligible: false,
            lessons_complete: false,
            quizzes_complete: false,
            progress_percent: 0,
            degraded: true,
        }
    }
}

/// Evaluates diploma eligibility from course, quiz and progress stores.
///
/// The required module set follows world resolution: for a tracked course,
/// each registered world contributes its remote lesson ids, or its static
/// content id when the backend has no lessons for it.
#[derive(Clone)]
pub struct DiplomaGate {
    registry: Arc<ContentRegistry>,
    tracks: TrackMap,
    courses: Arc<dyn CourseStore>,
    quizzes: Arc<dyn QuizStore>,
    events: Arc<dyn EventRepository>,
}

impl std::fmt::Debug for DiplomaGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiplomaGate").finish_non_exhaustive()
    }
}

impl DiplomaGate {
    /// Creates a gate.
    #[must_use]
    pub fn new(
        registry: Arc<ContentRegistry>,
        tracks: TrackMap,
        courses: Arc<dyn CourseStore>,
        quizzes: Arc<dyn QuizStore>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            registry,
            tracks,
            courses,
            quizzes,
            events,
        }
    }

    /// Evaluates eligibility. Never fails: any fetch error yields
    /// [`Eligibility::not_eligible`].
    #[instrument(skip(self))]
    pub async fn is_eligible(&self, course_id: &str, user_id: Uuid) -> Eligibility {
        match self.evaluate(course_id, user_id).await {
            Ok(eligibility) => eligibility,
            Err(e) => {
                warn!(error = %e, "eligibility check failed, reporting not eligible");
                Eligibility::not_eligible()
            }
        }
    }

    async fn evaluate(&self, course_id: &str, user_id: Uuid) -> Result<Eligibility, DomainError> {
        let course = self.courses.fetch_course(course_id).await?;
        let required = self
            .registry
            .course_module_ids(self.tracks.track_for(course_id), course.as_ref());
        let progress = get_progress(user_id, self.events.as_ref()).await?;

        let progress_percent = completion_percent(&progress.completed_modules, &required);
        let lessons_complete = !required.is_empty()
            && required
                .iter()
                .all(|id| progress.completed_modules.contains(id));

        let mut quizzes_complete = true;
        for quiz in self.quizzes.quizzes_for_modules(&required).await? {
            if !self.quizzes.has_passing_result(user_id, quiz.quiz_id).await? {
                quizzes_complete = false;
                break;
            }
        }

        debug!(
            required = required.len(),
            progress_percent,
            lessons_complete,
            quizzes_complete,
            "eligibility evaluated"
        );

        Ok(Eligibility {
            eligible: lessons_complete && quizzes_complete,
            lessons_complete,
            quizzes_complete,
            progress_percent,
            degraded: false,
        })
    }
}
