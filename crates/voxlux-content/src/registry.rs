//! Static Content Registry and Theme Registry.
//!
//! Each track is authored as one YAML document embedded at build time.
//! Slot bodies are written as `text` (plain), `markdown` (rendered to HTML
//! long text) or `segments`. The registry is immutable once built.

use std::collections::BTreeMap;

use pulldown_cmark::{Options, Parser, html};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use voxlux_core::error::DomainError;

use crate::domain::course::Course;
use crate::domain::theme::WorldTheme;
use crate::domain::track::Track;
use crate::domain::world::{ContentSlot, Download, DualModules, Segment, SlotBody, WorldContent};

const STORYTELLING_SOURCE: &str = include_str!("../data/storytelling.yaml");
const PODCAST_SOURCE: &str = include_str!("../data/podcast.yaml");

#[derive(Debug, Deserialize)]
struct TrackDocument {
    track: Track,
    worlds: Vec<WorldDocument>,
}

#[derive(Debug, Deserialize)]
struct WorldDocument {
    number: u32,
    id: String,
    title: String,
    intro: String,
    outro: String,
    theme: WorldTheme,
    sun: SlotDocument,
    moon: SlotDocument,
    golden_thread: SlotDocument,
    #[serde(default)]
    extras: Vec<SlotDocument>,
}

#[derive(Debug, Deserialize)]
struct SlotDocument {
    title: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    segments: Option<Vec<Segment>>,
    #[serde(default)]
    video: Option<String>,
    #[serde(default)]
    downloads: Vec<Download>,
}

impl SlotDocument {
    fn into_slot(self, world_id: &str) -> Result<ContentSlot, DomainError> {
        let body = match (self.text, self.markdown, self.segments) {
            (Some(text), None, None) => SlotBody::Plain(text.trim().to_owned()),
            (None, Some(markdown), None) => SlotBody::LongText(render_markdown(&markdown)),
            (None, None, Some(segments)) => SlotBody::Segments(segments),
            _ => {
                return Err(DomainError::Validation(format!(
                    "slot '{}' of world {world_id} must have exactly one of text, markdown or segments",
                    self.title
                )));
            }
        };
        Ok(ContentSlot {
            title: self.title,
            body,
            video: self.video,
            downloads: self.downloads,
        })
    }
}

/// Renders Markdown to HTML.
fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Immutable per-world content and themes, keyed by track and world number.
#[derive(Debug, Clone)]
pub struct ContentRegistry {
    worlds: BTreeMap<(Track, u32), WorldContent>,
    themes: BTreeMap<(Track, u32), WorldTheme>,
    version_hash: String,
}

impl ContentRegistry {
    /// Builds the registry from the embedded track documents.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if an embedded document is
    /// malformed or declares the same world twice.
    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_sources(&[STORYTELLING_SOURCE, PODCAST_SOURCE])
    }

    /// Builds a registry from YAML track documents.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a document does not parse, a
    /// world number is zero, a slot body is ambiguous, or a world is declared
    /// twice.
    pub fn from_sources(sources: &[&str]) -> Result<Self, DomainError> {
        let mut worlds = BTreeMap::new();
        let mut themes = BTreeMap::new();
        let mut hasher = Sha256::new();

        for source in sources {
            hasher.update(source.as_bytes());
            let document: TrackDocument = serde_yaml::from_str(source)
                .map_err(|e| DomainError::Validation(format!("invalid content document: {e}")))?;
            let track = document.track;

            for world in document.worlds {
                if world.number == 0 {
                    return Err(DomainError::Validation(format!(
                        "world {} has number 0; worlds are numbered from 1",
                        world.id
                    )));
                }
                let key = (track, world.number);
                if worlds.contains_key(&key) {
                    return Err(DomainError::Validation(format!(
                        "world {} of track {} is declared twice",
                        world.number,
                        track.as_str()
                    )));
                }

                let content = WorldContent {
                    dual_modules: DualModules {
                        sun_content: world.sun.into_slot(&world.id)?,
                        moon_content: world.moon.into_slot(&world.id)?,
                        golden_thread: world.golden_thread.into_slot(&world.id)?,
                    },
                    extra_modules: world
                        .extras
                        .into_iter()
                        .map(|slot| slot.into_slot(&world.id))
                        .collect::<Result<_, _>>()?,
                    id: world.id,
                    track,
                    world_number: world.number,
                    title: world.title,
                    intro: world.intro.trim().to_owned(),
                    outro: world.outro.trim().to_owned(),
                };
                themes.insert(key, world.theme);
                worlds.insert(key, content);
            }
        }

        let version_hash = hex::encode(hasher.finalize());
        debug!(worlds = worlds.len(), %version_hash, "content registry built");

        Ok(Self {
            worlds,
            themes,
            version_hash,
        })
    }

    /// Returns the static content of a world; `None` is a valid outcome.
    #[must_use]
    pub fn world(&self, track: Track, world_number: u32) -> Option<&WorldContent> {
        self.worlds.get(&(track, world_number))
    }

    /// Returns the theme of a world.
    #[must_use]
    pub fn theme(&self, track: Track, world_number: u32) -> Option<&WorldTheme> {
        self.themes.get(&(track, world_number))
    }

    /// Returns the number of worlds registered for `track`.
    #[must_use]
    pub fn world_count(&self, track: Track) -> usize {
        self.worlds.keys().filter(|(t, _)| *t == track).count()
    }

    /// Module ids of world `world_number`: the remote lesson ids when the
    /// backend has lessons for that world, else the static content id.
    #[must_use]
    pub fn world_module_ids(
        &self,
        track: Option<Track>,
        course: Option<&Course>,
        world_number: u32,
    ) -> Vec<String> {
        if let Some(mastermind) = course.and_then(|c| c.mastermind_for_world(world_number))
            && !mastermind.lessons.is_empty()
        {
            return mastermind.lesson_ids();
        }
        track
            .and_then(|t| self.world(t, world_number))
            .map(|w| vec![w.id.clone()])
            .unwrap_or_default()
    }

    /// Every module id a learner must complete to finish a course.
    ///
    /// A tracked course walks its registered worlds with
    /// [`Self::world_module_ids`]; an untracked one is exactly the remote
    /// lesson list.
    #[must_use]
    pub fn course_module_ids(&self, track: Option<Track>, course: Option<&Course>) -> Vec<String> {
        let Some(track) = track else {
            return course.map(Course::lesson_ids).unwrap_or_default();
        };
        self.worlds
            .keys()
            .filter(|(t, _)| *t == track)
            .flat_map(|&(_, n)| self.world_module_ids(Some(track), course, n))
            .collect()
    }

    /// SHA-256 of the registry sources, hex encoded.
    #[must_use]
    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r"
track: podcast
worlds:
  - number: 1
    id: pod-test-01
    title: Test
    intro: hello
    outro: bye
    theme:
      name: T
      tagline: t
      primary_color: '#000000'
      accent_color: '#ffffff'
      audio_cue: hum
    sun:
      title: Sun
      text: plain words
    moon:
      title: Moon
      markdown: 'Some **bold** words'
    golden_thread:
      title: Thread
      segments:
        - heading: One
          text: first
        - text: second
";

    #[test]
    fn test_builtin_registry_has_ten_worlds_per_track() {
        let registry = ContentRegistry::builtin().unwrap();

        assert_eq!(registry.world_count(Track::Storytelling), 10);
        assert_eq!(registry.world_count(Track::Podcast), 10);
        for n in 1..=10 {
            assert!(registry.world(Track::Storytelling, n).is_some());
            assert!(registry.world(Track::Podcast, n).is_some());
            assert!(registry.theme(Track::Storytelling, n).is_some());
            assert!(registry.theme(Track::Podcast, n).is_some());
        }
    }

    #[test]
    fn test_builtin_world_ids_are_unique() {
        let registry = ContentRegistry::builtin().unwrap();
        let mut ids: Vec<&str> = registry.worlds.values().map(|w| w.id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_absent_world_is_none_not_error() {
        let registry = ContentRegistry::builtin().unwrap();

        assert!(registry.world(Track::Storytelling, 0).is_none());
        assert!(registry.world(Track::Podcast, 11).is_none());
    }

    #[test]
    fn test_body_kinds_are_parsed() {
        let registry = ContentRegistry::from_sources(&[MINIMAL]).unwrap();
        let world = registry.world(Track::Podcast, 1).unwrap();

        assert_eq!(
            world.dual_modules.sun_content.body,
            SlotBody::Plain("plain words".to_owned())
        );
        match &world.dual_modules.moon_content.body {
            SlotBody::LongText(html) => assert!(html.contains("<strong>bold</strong>")),
            other => panic!("expected LongText, got {other:?}"),
        }
        match &world.dual_modules.golden_thread.body {
            SlotBody::Segments(segments) => {
                assert_eq!(segments.len(), 2);
                assert_eq!(segments[0].heading.as_deref(), Some("One"));
                assert!(segments[1].heading.is_none());
            }
            other => panic!("expected Segments, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_world_is_rejected() {
        let result = ContentRegistry::from_sources(&[MINIMAL, MINIMAL]);

        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("declared twice")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_body_is_rejected() {
        let source = MINIMAL.replace("text: plain words", "text: plain\n      markdown: also");

        assert!(matches!(
            ContentRegistry::from_sources(&[&source]),
            Err(DomainError::Validation(_))
        ));
    }

    fn remote_course(lessons_per_world: &[usize]) -> Course {
        use crate::domain::course::{Lesson, Mastermind};

        Course {
            id: "storytelling".to_owned(),
            title: "Storytelling".to_owned(),
            description: String::new(),
            masterminds: lessons_per_world
                .iter()
                .enumerate()
                .map(|(i, &count)| Mastermind {
                    id: format!("mm-{}", i + 1),
                    title: format!("World {}", i + 1),
                    subtitle: None,
                    lessons: (0..count)
                        .map(|l| Lesson::new(format!("r-{}-{l}", i + 1)))
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_world_module_ids_prefer_remote_lessons() {
        // Arrange
        let registry = ContentRegistry::builtin().unwrap();
        let course = remote_course(&[2, 0]);

        // Act
        let remote = registry.world_module_ids(Some(Track::Storytelling), Some(&course), 1);
        let empty_remote = registry.world_module_ids(Some(Track::Storytelling), Some(&course), 2);
        let untracked = registry.world_module_ids(None, None, 1);

        // Assert
        assert_eq!(remote, vec!["r-1-0", "r-1-1"]);
        assert_eq!(empty_remote, vec!["storytelling-02-hero"]);
        assert!(untracked.is_empty());
    }

    #[test]
    fn test_course_module_ids_fall_back_to_static_worlds() {
        // Arrange
        let registry = ContentRegistry::builtin().unwrap();

        // Act
        let ids = registry.course_module_ids(Some(Track::Storytelling), None);

        // Assert
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], "storytelling-01-origin");
        assert_eq!(ids[9], "storytelling-10-elixir");
    }

    #[test]
    fn test_course_module_ids_mix_remote_and_static_per_world() {
        // Arrange
        let registry = ContentRegistry::builtin().unwrap();
        let course = remote_course(&[1, 0, 2]);

        // Act
        let ids = registry.course_module_ids(Some(Track::Storytelling), Some(&course));

        // Assert
        assert_eq!(ids.len(), 1 + 1 + 2 + 7);
        assert_eq!(&ids[..4], ["r-1-0", "storytelling-02-hero", "r-3-0", "r-3-1"]);
        assert_eq!(ids[4], "storytelling-04-mentor");
    }

    #[test]
    fn test_untracked_course_module_ids_are_the_remote_lessons() {
        let registry = ContentRegistry::builtin().unwrap();
        let course = remote_course(&[1, 1]);

        assert_eq!(registry.course_module_ids(None, Some(&course)), vec!["r-1-0", "r-2-0"]);
        assert!(registry.course_module_ids(None, None).is_empty());
    }

    #[test]
    fn test_version_hash_tracks_sources() {
        let a = ContentRegistry::from_sources(&[MINIMAL]).unwrap();
        let b = ContentRegistry::from_sources(&[MINIMAL]).unwrap();
        let changed = MINIMAL.replace("plain words", "other words");
        let c = ContentRegistry::from_sources(&[&changed]).unwrap();

        assert_eq!(a.version_hash(), b.version_hash());
        assert_ne!(a.version_hash(), c.version_hash());
        assert_eq!(a.version_hash().len(), 64);
    }
}
