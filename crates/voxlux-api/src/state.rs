//! Shared application state.

use std::sync::Arc;

use uuid::Uuid;
use voxlux_content::application::fetcher::RemoteOverrideFetcher;
use voxlux_content::domain::store::CourseStore;
use voxlux_content::domain::track::TrackMap;
use voxlux_content::registry::ContentRegistry;
use voxlux_core::clock::Clock;
use voxlux_core::flags::FlagService;
use voxlux_core::repository::EventRepository;
use voxlux_progress::application::cache::ProgressCache;
use voxlux_progress::application::diploma::DiplomaGate;
use voxlux_quiz::application::service::QuizService;
use voxlux_quiz::domain::store::QuizStore;
use voxlux_world::resolver::WorldResolver;
use voxlux_world::view::WorldViewConfig;

use crate::sessions::SessionRegistry;

/// The storage backends the state is assembled from.
#[derive(Clone)]
pub struct Backends {
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
    /// Event stream store (learner progress).
    pub events: Arc<dyn EventRepository>,
    /// Remote course records.
    pub courses: Arc<dyn CourseStore>,
    /// Quiz definitions and results.
    pub quizzes: Arc<dyn QuizStore>,
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
    /// Event repository.
    pub event_repository: Arc<dyn EventRepository>,
    /// World resolver.
    pub resolver: Arc<WorldResolver>,
    /// Quiz application service.
    pub quizzes: QuizService,
    /// Diploma gate.
    pub diploma: DiplomaGate,
    /// Process-wide flags.
    pub flags: Arc<FlagService>,
    /// Tunables for mounted views.
    pub view_config: WorldViewConfig,
    /// Mounted world sessions.
    pub sessions: SessionRegistry,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("flags", &self.flags)
            .field("view_config", &self.view_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        backends: Backends,
        registry: Arc<ContentRegistry>,
        tracks: TrackMap,
        flags: Arc<FlagService>,
        view_config: WorldViewConfig,
    ) -> Self {
        let fetcher = RemoteOverrideFetcher::new(Arc::clone(&backends.courses));
        let diploma = DiplomaGate::new(
            Arc::clone(&registry),
            tracks.clone(),
            backends.courses,
            Arc::clone(&backends.quizzes),
            Arc::clone(&backends.events),
        );
        Self {
            resolver: Arc::new(WorldResolver::new(registry, tracks, fetcher)),
            quizzes: QuizService::new(backends.quizzes, Arc::clone(&backends.clock)),
            diploma,
            clock: backends.clock,
            event_repository: backends.events,
            flags,
            view_config,
            sessions: SessionRegistry::default(),
        }
    }

    /// A fresh, unloaded progress cache for `user_id`.
    #[must_use]
    pub fn progress_cache(&self, user_id: Uuid) -> ProgressCache {
        ProgressCache::new(
            user_id,
            Arc::clone(&self.event_repository),
            Arc::clone(&self.clock),
        )
    }
}
