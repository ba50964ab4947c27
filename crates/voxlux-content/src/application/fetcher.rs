//! Remote Override Fetcher.
//!
//! Reads the authoritative course record from the backend. Any failure is
//! recovered locally: the caller keeps the static registry content.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::course::{Course, Mastermind};
use crate::domain::store::CourseStore;

/// Fetches remote course records, never failing.
#[derive(Clone)]
pub struct RemoteOverrideFetcher {
    store: Arc<dyn CourseStore>,
}

impl std::fmt::Debug for RemoteOverrideFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteOverrideFetcher").finish_non_exhaustive()
    }
}

impl RemoteOverrideFetcher {
    /// Creates a fetcher over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }

    /// Fetches a course. Absence and backend failure both yield `None`.
    #[instrument(skip(self))]
    pub async fn fetch_course(&self, course_id: &str) -> Option<Course> {
        match self.store.fetch_course(course_id).await {
            Ok(Some(course)) => {
                debug!(masterminds = course.masterminds.len(), "remote course fetched");
                Some(course)
            }
            Ok(None) => {
                debug!("no remote course record, using static content");
                None
            }
            Err(e) => {
                warn!(error = %e, "remote course fetch failed, falling back to static content");
                None
            }
        }
    }

    /// Fetches the mastermind at position `world_number - 1` of a course.
    pub async fn fetch_world(&self, course_id: &str, world_number: u32) -> Option<Mastermind> {
        if world_number == 0 {
            return None;
        }
        self.fetch_course(course_id)
            .await?
            .mastermind_for_world(world_number)
            .cloned()
    }
}
