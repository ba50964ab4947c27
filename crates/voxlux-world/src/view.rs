//! A mounted world view: the stage machine plus the work that runs while
//! the world is on screen.
//!
//! Mounting starts two tasks: the intro timer, and a settle task that looks
//! up quiz availability (and, when mounted from static content, fetches the
//! remote overrides first). Unmounting aborts both; a task that still
//! completes after the view was torn down finds it unmounted and discards
//! its result.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use voxlux_content::domain::world::{ContentSlot, SlotRef};
use voxlux_quiz::application::service::QuizService;
use voxlux_quiz::domain::quiz::QuizRef;

use crate::resolver::{ResolvedWorld, WorldResolver};
use crate::stage::{QuizOutcome, Stage, StageEffect, StageMachine};

/// Presentation delay before the intro gives way to the first slot.
pub const DEFAULT_INTRO_DELAY: Duration = Duration::from_secs(4);

/// Tunables for mounted views.
#[derive(Debug, Clone, Copy)]
pub struct WorldViewConfig {
    /// Intro presentation delay.
    pub intro_delay: Duration,
}

impl Default for WorldViewConfig {
    fn default() -> Self {
        Self {
            intro_delay: DEFAULT_INTRO_DELAY,
        }
    }
}

/// What a mount request needs to know about the learner.
#[derive(Debug, Clone)]
pub struct MountRequest {
    /// Course id.
    pub course_id: String,
    /// Theme id, e.g. `mondo_3`.
    pub theme_id: String,
    /// The learner's completed module ids.
    pub completed: HashSet<String>,
    /// Whether god mode is on.
    pub god_mode: bool,
}

/// Events a view raises for its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorldEvent {
    /// Every module of the world should be recorded as completed.
    Completed {
        /// Course id.
        course_id: String,
        /// World number.
        world_number: u32,
        /// Module ids to record.
        module_ids: Vec<String>,
    },
    /// The view must be left (failed quiz).
    Exited {
        /// Course id.
        course_id: String,
        /// World number.
        world_number: u32,
    },
}

/// Read-only state of a view.
#[derive(Debug, Clone, Serialize)]
pub struct WorldViewSnapshot {
    /// Current stage.
    pub stage: Stage,
    /// Slot addressed by the current stage.
    pub slot: Option<SlotRef>,
    /// Content of that slot.
    pub current: Option<ContentSlot>,
    /// The quiz following the content, once known.
    pub quiz: Option<QuizRef>,
    /// Whether remote overrides and quiz availability have been applied.
    pub overrides_settled: bool,
    /// Whether the view is still mounted.
    pub mounted: bool,
    /// The resolved world.
    pub world: ResolvedWorld,
}

#[derive(Debug)]
struct ViewState {
    machine: StageMachine,
    world: ResolvedWorld,
    quiz: Option<QuizRef>,
    overrides_settled: bool,
    mounted: bool,
    /// Bumped each time the intro timer is armed; stale timers compare it.
    intro_generation: u64,
}

type SharedState = Arc<Mutex<ViewState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A world on screen.
#[derive(Debug)]
pub struct WorldView {
    state: SharedState,
    config: WorldViewConfig,
    intro_task: Option<JoinHandle<()>>,
    override_task: Option<JoinHandle<()>>,
}

impl WorldView {
    /// Mounts a world from static content and fetches remote overrides in
    /// the background. Must be called within a tokio runtime.
    #[must_use]
    pub fn mount(
        resolver: Arc<WorldResolver>,
        quizzes: QuizService,
        config: WorldViewConfig,
        request: MountRequest,
    ) -> Self {
        let world = resolver.resolve_static(
            &request.course_id,
            &request.theme_id,
            &request.completed,
            request.god_mode,
        );
        let state = new_state(world);
        let task = tokio::spawn(fetch_and_settle(Arc::clone(&state), resolver, quizzes, request));
        Self::start(state, config, task)
    }

    /// Mounts an already resolved world. Only quiz availability is looked
    /// up in the background; the course is not fetched again. Must be called
    /// within a tokio runtime.
    #[must_use]
    pub fn mount_resolved(world: ResolvedWorld, quizzes: QuizService, config: WorldViewConfig) -> Self {
        let module_ids = world.module_ids.clone();
        let state = new_state(world);
        let settle_state = Arc::clone(&state);
        let task = tokio::spawn(async move {
            let quiz = lookup_quiz(&quizzes, &module_ids).await;
            settle(&settle_state, None, quiz);
        });
        Self::start(state, config, task)
    }

    fn start(state: SharedState, config: WorldViewConfig, task: JoinHandle<()>) -> Self {
        {
            let state = lock(&state);
            info!(
                course_id = %state.world.course_id,
                world_number = state.world.world_number,
                "world view mounted"
            );
        }
        let mut view = Self {
            state,
            config,
            intro_task: None,
            override_task: Some(task),
        };
        view.arm_intro_timer();
        view
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> WorldViewSnapshot {
        let state = lock(&self.state);
        let stage = state.machine.stage();
        let slot = stage.slot();
        WorldViewSnapshot {
            stage,
            slot,
            current: slot.and_then(|s| state.world.content.as_ref()?.slot(s).cloned()),
            quiz: state.quiz.clone(),
            overrides_settled: state.overrides_settled,
            mounted: state.mounted,
            world: state.world.clone(),
        }
    }

    /// User "advance" action. Leaving the last content stage waits for the
    /// settle task, so a world never completes before its quiz is known.
    pub async fn advance(&mut self) -> Option<WorldEvent> {
        let awaiting = {
            let state = lock(&self.state);
            if !state.mounted {
                return None;
            }
            state.machine.awaiting_quiz_availability()
        };
        if awaiting {
            self.settled().await;
        }

        let mut state = lock(&self.state);
        if !state.mounted {
            return None;
        }
        if state.machine.awaiting_quiz_availability() {
            // The settle task ended without reporting.
            warn!("quiz availability never settled, treating world as quiz-less");
            state.machine.set_quiz_available(false);
        }
        let effect = state.machine.advance();
        effect.map(|e| to_event(&state, e))
    }

    /// User "back" action. Going back to the intro re-arms its timer.
    pub fn back(&mut self) -> bool {
        let moved_to_intro = {
            let mut state = lock(&self.state);
            if !state.mounted || !state.machine.back() {
                return false;
            }
            state.machine.stage() == Stage::Intro
        };
        if moved_to_intro {
            self.arm_intro_timer();
        }
        true
    }

    /// Feeds the quiz outcome into the machine.
    pub fn quiz_result(&self, outcome: QuizOutcome) -> Option<WorldEvent> {
        let mut state = lock(&self.state);
        if !state.mounted {
            return None;
        }
        let effect = state.machine.quiz_result(outcome);
        effect.map(|e| to_event(&state, e))
    }

    /// Tears the view down: cancels the intro timer and discards any fetch
    /// still in flight.
    pub fn unmount(&mut self) {
        lock(&self.state).mounted = false;
        self.abort_tasks();
        debug!("world view unmounted");
    }

    /// Waits until the settle task has applied or discarded its result.
    pub async fn settled(&mut self) {
        if let Some(task) = self.override_task.take() {
            // A cancelled task has nothing left to apply.
            let _ = task.await;
        }
    }

    fn arm_intro_timer(&mut self) {
        if let Some(task) = self.intro_task.take() {
            task.abort();
        }
        let generation = {
            let mut state = lock(&self.state);
            state.intro_generation += 1;
            state.intro_generation
        };
        let state = Arc::clone(&self.state);
        let delay = self.config.intro_delay;
        self.intro_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = lock(&state);
            if state.mounted && state.intro_generation == generation {
                state.machine.intro_elapsed();
            }
        }));
    }

    fn abort_tasks(&mut self) {
        if let Some(task) = self.intro_task.take() {
            task.abort();
        }
        if let Some(task) = self.override_task.take() {
            task.abort();
        }
    }
}

impl Drop for WorldView {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

fn to_event(state: &ViewState, effect: StageEffect) -> WorldEvent {
    match effect {
        StageEffect::WorldCompleted => WorldEvent::Completed {
            course_id: state.world.course_id.clone(),
            world_number: state.world.world_number,
            module_ids: state.world.module_ids.clone(),
        },
        StageEffect::ExitView => WorldEvent::Exited {
            course_id: state.world.course_id.clone(),
            world_number: state.world.world_number,
        },
    }
}

fn new_state(world: ResolvedWorld) -> SharedState {
    let extras = world.content.as_ref().map_or(0, |c| c.extra_modules.len());
    Arc::new(Mutex::new(ViewState {
        machine: StageMachine::new(extras),
        world,
        quiz: None,
        overrides_settled: false,
        mounted: true,
        intro_generation: 0,
    }))
}

async fn fetch_and_settle(
    state: SharedState,
    resolver: Arc<WorldResolver>,
    quizzes: QuizService,
    request: MountRequest,
) {
    let world = resolver
        .resolve(
            &request.course_id,
            &request.theme_id,
            &request.completed,
            request.god_mode,
        )
        .await;
    let quiz = lookup_quiz(&quizzes, &world.module_ids).await;
    settle(&state, Some(world), quiz);
}

async fn lookup_quiz(quizzes: &QuizService, module_ids: &[String]) -> Option<QuizRef> {
    match quizzes.quiz_for_world(module_ids).await {
        Ok(quiz) => quiz,
        Err(e) => {
            warn!(error = %e, "quiz lookup failed, treating world as quiz-less");
            None
        }
    }
}

/// Applies the settle result. `world` replaces the static resolution when
/// remote overrides were fetched.
fn settle(state: &SharedState, world: Option<ResolvedWorld>, quiz: Option<QuizRef>) {
    let mut state = lock(state);
    if !state.mounted {
        debug!("discarding settle result for an unmounted world view");
        return;
    }
    if let Some(world) = world {
        let extras = world.content.as_ref().map_or(0, |c| c.extra_modules.len());
        state.machine.set_extra_count(extras);
        state.world = world;
    }
    state.machine.set_quiz_available(quiz.is_some());
    state.quiz = quiz;
    state.overrides_settled = true;
}

#[cfg(test)]
mod tests {
    use voxlux_content::application::fetcher::RemoteOverrideFetcher;
    use voxlux_content::domain::store::CourseStore;
    use voxlux_content::domain::track::TrackMap;
    use voxlux_content::registry::ContentRegistry;
    use voxlux_quiz::domain::store::QuizStore;
    use voxlux_test_support::{
        FailingQuizStore, FixedClock, GatedCourseStore, InMemoryCourseStore, InMemoryQuizStore,
        sample_course, sample_quiz,
    };

    use super::*;

    fn resolver(store: Arc<dyn CourseStore>) -> Arc<WorldResolver> {
        Arc::new(WorldResolver::new(
            Arc::new(ContentRegistry::builtin().unwrap()),
            TrackMap::default(),
            RemoteOverrideFetcher::new(store),
        ))
    }

    fn quizzes(store: Arc<dyn QuizStore>) -> QuizService {
        QuizService::new(
            store,
            Arc::new(FixedClock::standard()),
        )
    }

    fn request(course_id: &str, theme_id: &str) -> MountRequest {
        MountRequest {
            course_id: course_id.to_owned(),
            theme_id: theme_id.to_owned(),
            completed: HashSet::new(),
            god_mode: true,
        }
    }

    fn mount_plain(theme_id: &str) -> WorldView {
        WorldView::mount(
            resolver(Arc::new(InMemoryCourseStore::default())),
            quizzes(Arc::new(InMemoryQuizStore::default())),
            WorldViewConfig::default(),
            request("storytelling", theme_id),
        )
    }

    async fn past_intro() {
        tokio::time::sleep(DEFAULT_INTRO_DELAY + Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_intro_timer_moves_to_sun() {
        // Arrange
        let view = mount_plain("mondo_1");
        assert_eq!(view.snapshot().stage, Stage::Intro);

        // Act
        tokio::time::sleep(DEFAULT_INTRO_DELAY - Duration::from_millis(1)).await;
        let before = view.snapshot().stage;
        tokio::time::sleep(Duration::from_millis(2)).await;

        // Assert
        assert_eq!(before, Stage::Intro);
        let snapshot = view.snapshot();
        assert_eq!(snapshot.stage, Stage::Sun);
        assert_eq!(snapshot.current.unwrap().title, "Anatomy of a Spark");
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_during_intro_is_a_noop() {
        let mut view = mount_plain("mondo_1");

        assert!(view.advance().await.is_none());

        assert_eq!(view.snapshot().stage, Stage::Intro);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_pending_intro_timer() {
        let mut view = mount_plain("mondo_1");

        view.unmount();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = view.snapshot();
        assert_eq!(snapshot.stage, Stage::Intro);
        assert!(!snapshot.mounted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_intro_rearms_timer() {
        // Arrange
        let mut view = mount_plain("mondo_1");
        past_intro().await;
        assert_eq!(view.snapshot().stage, Stage::Sun);

        // Act
        assert!(view.back());
        let immediately = view.snapshot().stage;
        past_intro().await;

        // Assert
        assert_eq!(immediately, Stage::Intro);
        assert_eq!(view.snapshot().stage, Stage::Sun);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fetch_is_discarded_after_unmount() {
        // Arrange
        let store = Arc::new(GatedCourseStore::new(vec![sample_course("storytelling", 10, 3)]));
        let mut view = WorldView::mount(
            resolver(store.clone()),
            quizzes(Arc::new(InMemoryQuizStore::default())),
            WorldViewConfig::default(),
            request("storytelling", "mondo_1"),
        );
        tokio::task::yield_now().await;

        // Act
        view.unmount();
        store.release();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Assert
        let snapshot = view.snapshot();
        assert!(!snapshot.overrides_settled);
        assert!(!snapshot.world.overridden);
        assert_eq!(
            snapshot.world.content.unwrap().dual_modules.sun_content.title,
            "Anatomy of a Spark"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrides_apply_while_mounted() {
        // Arrange
        let store = Arc::new(GatedCourseStore::new(vec![sample_course("storytelling", 10, 3)]));
        let mut view = WorldView::mount(
            resolver(store.clone()),
            quizzes(Arc::new(InMemoryQuizStore::default())),
            WorldViewConfig::default(),
            request("storytelling", "mondo_1"),
        );

        // Act
        store.release();
        view.settled().await;
        past_intro().await;

        // Assert
        let snapshot = view.snapshot();
        assert_eq!(store.calls(), 1);
        assert!(snapshot.overrides_settled);
        assert!(snapshot.world.overridden);
        assert_eq!(snapshot.current.unwrap().title, "Remote lesson 1.0");
        assert_eq!(
            snapshot.world.module_ids,
            vec!["storytelling-w1-l0", "storytelling-w1-l1", "storytelling-w1-l2"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_world_without_quiz_completes_once_after_thread() {
        // Arrange
        let mut view = mount_plain("mondo_2");
        view.settled().await;
        past_intro().await;

        // Act
        view.advance().await;
        view.advance().await;
        let event = view.advance().await;
        let again = view.advance().await;

        // Assert
        assert_eq!(
            event,
            Some(WorldEvent::Completed {
                course_id: "storytelling".to_owned(),
                world_number: 2,
                module_ids: vec!["storytelling-02-hero".to_owned()],
            })
        );
        assert!(again.is_none());
        assert_eq!(view.snapshot().stage, Stage::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiz_gates_completion() {
        // Arrange
        let quiz = sample_quiz("storytelling-04-mentor", 3, 60);
        let mut view = WorldView::mount(
            resolver(Arc::new(InMemoryCourseStore::default())),
            quizzes(Arc::new(InMemoryQuizStore::new(vec![quiz.clone()]))),
            WorldViewConfig::default(),
            request("storytelling", "mondo_4"),
        );
        view.settled().await;
        past_intro().await;

        // Act: sun, moon, golden thread, one extra
        for _ in 0..4 {
            assert!(view.advance().await.is_none());
        }
        let snapshot = view.snapshot();
        let event = view.quiz_result(QuizOutcome::Passed);

        // Assert
        assert_eq!(snapshot.stage, Stage::QuizActive);
        assert_eq!(snapshot.quiz.unwrap().quiz_id, quiz.id);
        assert!(matches!(event, Some(WorldEvent::Completed { .. })));
        assert_eq!(view.snapshot().stage, Stage::FinalRitual);
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_waits_for_quiz_lookup_before_leaving_content() {
        // Arrange
        let quiz = sample_quiz("storytelling-04-mentor", 3, 60);
        let store = Arc::new(GatedCourseStore::new(Vec::new()));
        let mut view = WorldView::mount(
            resolver(store.clone()),
            quizzes(Arc::new(InMemoryQuizStore::new(vec![quiz.clone()]))),
            WorldViewConfig::default(),
            request("storytelling", "mondo_4"),
        );
        past_intro().await;
        for _ in 0..3 {
            assert!(view.advance().await.is_none());
        }
        assert!(!view.snapshot().overrides_settled);
        let gate = Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            gate.release();
        });

        // Act: the fourth advance leaves the last extra
        let event = view.advance().await;

        // Assert
        let snapshot = view.snapshot();
        assert!(event.is_none());
        assert!(snapshot.overrides_settled);
        assert_eq!(snapshot.stage, Stage::QuizActive);
        assert_eq!(snapshot.quiz.unwrap().quiz_id, quiz.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_resolved_does_not_fetch_the_course_again() {
        // Arrange
        let store = Arc::new(GatedCourseStore::new(vec![sample_course("storytelling", 10, 3)]));
        store.release();
        let resolver = resolver(store.clone());
        let world = resolver
            .resolve("storytelling", "mondo_1", &HashSet::new(), true)
            .await;

        // Act
        let mut view = WorldView::mount_resolved(
            world,
            quizzes(Arc::new(InMemoryQuizStore::default())),
            WorldViewConfig::default(),
        );
        view.settled().await;

        // Assert
        let snapshot = view.snapshot();
        assert_eq!(store.calls(), 1);
        assert!(snapshot.overrides_settled);
        assert!(snapshot.world.overridden);
        assert_eq!(snapshot.world.module_ids[0], "storytelling-w1-l0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_quiz_exits_and_remount_starts_fresh() {
        let quiz_store: Arc<dyn QuizStore> =
            Arc::new(InMemoryQuizStore::new(vec![sample_quiz("storytelling-03-threshold", 2, 100)]));
        let resolver = resolver(Arc::new(InMemoryCourseStore::default()));
        let mut view = WorldView::mount(
            Arc::clone(&resolver),
            quizzes(Arc::clone(&quiz_store)),
            WorldViewConfig::default(),
            request("storytelling", "mondo_3"),
        );
        view.settled().await;
        past_intro().await;
        view.advance().await;
        view.advance().await;
        view.advance().await;

        let event = view.quiz_result(QuizOutcome::Failed);
        view.unmount();
        let fresh = WorldView::mount(
            resolver,
            quizzes(quiz_store),
            WorldViewConfig::default(),
            request("storytelling", "mondo_3"),
        );

        assert!(matches!(event, Some(WorldEvent::Exited { world_number: 3, .. })));
        assert_eq!(fresh.snapshot().stage, Stage::Intro);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiz_lookup_failure_means_no_quiz() {
        let mut view = WorldView::mount(
            resolver(Arc::new(InMemoryCourseStore::default())),
            quizzes(Arc::new(FailingQuizStore)),
            WorldViewConfig::default(),
            request("storytelling", "mondo_2"),
        );
        view.settled().await;
        past_intro().await;

        view.advance().await;
        view.advance().await;
        let event = view.advance().await;

        assert!(view.snapshot().quiz.is_none());
        assert!(matches!(event, Some(WorldEvent::Completed { .. })));
    }
}
