//! World Resolver: (course id, theme id, completion set) to content and view.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};
use voxlux_content::application::fetcher::RemoteOverrideFetcher;
use voxlux_content::domain::course::Course;
use voxlux_content::domain::theme::WorldTheme;
use voxlux_content::domain::track::{Track, TrackMap, ViewKind};
use voxlux_content::domain::world::WorldContent;
use voxlux_content::merge::merge;
use voxlux_content::registry::ContentRegistry;

use crate::theme_id::world_number;

/// Everything a presentation layer needs to mount one world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedWorld {
    /// Requested course.
    pub course_id: String,
    /// Requested theme id.
    pub theme_id: String,
    /// Extracted world number; 0 when the theme id is unrecognised.
    pub world_number: u32,
    /// Track of the course, if it is one of the two content tracks.
    pub track: Option<Track>,
    /// The view to mount. Always defined.
    pub view_kind: ViewKind,
    /// Static content with remote overrides applied. `None` is a valid
    /// outcome and means "render the empty state".
    pub content: Option<WorldContent>,
    /// Cosmetic descriptor.
    pub theme: Option<WorldTheme>,
    /// Module ids completed when this world is completed.
    pub module_ids: Vec<String>,
    /// Whether the learner may enter this world.
    pub unlocked: bool,
    /// Whether every module of this world is already completed.
    pub completed: bool,
    /// Whether a remote record was merged onto the static content.
    pub overridden: bool,
    /// Version hash of the static registry that served the content.
    pub registry_version: String,
}

/// Resolves worlds against the static registry and remote overrides.
#[derive(Debug, Clone)]
pub struct WorldResolver {
    registry: Arc<ContentRegistry>,
    tracks: TrackMap,
    fetcher: RemoteOverrideFetcher,
}

impl WorldResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(registry: Arc<ContentRegistry>, tracks: TrackMap, fetcher: RemoteOverrideFetcher) -> Self {
        Self {
            registry,
            tracks,
            fetcher,
        }
    }

    /// The static content the resolver reads from.
    #[must_use]
    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    /// The course-to-track map.
    #[must_use]
    pub fn tracks(&self) -> &TrackMap {
        &self.tracks
    }

    /// Fetches the remote course and resolves against it. Remote failures
    /// fall back to static content.
    #[instrument(skip(self, completed))]
    pub async fn resolve(
        &self,
        course_id: &str,
        theme_id: &str,
        completed: &HashSet<String>,
        god_mode: bool,
    ) -> ResolvedWorld {
        let course = self.fetcher.fetch_course(course_id).await;
        self.resolve_with(course_id, theme_id, course.as_ref(), completed, god_mode)
    }

    /// Resolves against static content only.
    #[must_use]
    pub fn resolve_static(
        &self,
        course_id: &str,
        theme_id: &str,
        completed: &HashSet<String>,
        god_mode: bool,
    ) -> ResolvedWorld {
        self.resolve_with(course_id, theme_id, None, completed, god_mode)
    }

    /// Resolves against an already fetched remote course. Total: every
    /// input produces a result.
    #[must_use]
    pub fn resolve_with(
        &self,
        course_id: &str,
        theme_id: &str,
        course: Option<&Course>,
        completed: &HashSet<String>,
        god_mode: bool,
    ) -> ResolvedWorld {
        let track = self.tracks.track_for(course_id);
        let number = world_number(track, theme_id);
        let view_kind = ViewKind::for_track(track);

        let static_content = track.and_then(|t| self.registry.world(t, number));
        let remote = course.and_then(|c| c.mastermind_for_world(number));
        let overridden = static_content.is_some() && remote.is_some_and(|m| !m.lessons.is_empty());
        let content = static_content.map(|s| merge(s, remote));
        let theme = track.and_then(|t| self.registry.theme(t, number)).cloned();

        let module_ids = self.registry.world_module_ids(track, course, number);
        let all_done = |ids: &[String]| ids.iter().all(|id| completed.contains(id));
        let completed_world = !module_ids.is_empty() && all_done(&module_ids);
        let unlocked = god_mode
            || number <= 1
            || all_done(&self.registry.world_module_ids(track, course, number - 1));

        debug!(
            world_number = number,
            ?view_kind,
            has_content = content.is_some(),
            overridden,
            unlocked,
            "world resolved"
        );

        ResolvedWorld {
            course_id: course_id.to_owned(),
            theme_id: theme_id.to_owned(),
            world_number: number,
            track,
            view_kind,
            content,
            theme,
            module_ids,
            unlocked,
            completed: completed_world,
            overridden,
            registry_version: self.registry.version_hash().to_owned(),
        }
    }
}
