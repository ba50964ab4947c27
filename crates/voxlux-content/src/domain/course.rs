//! Remote course model, as served by the backend module/lesson store.

use serde::{Deserialize, Serialize};

use super::world::Download;

/// A course: an ordered list of masterminds (worlds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course identifier.
    pub id: String,
    /// Course title.
    pub title: String,
    /// Course description.
    #[serde(default)]
    pub description: String,
    /// Worlds, in display order. Position `n - 1` is world `n`.
    #[serde(default)]
    pub masterminds: Vec<Mastermind>,
}

impl Course {
    /// Returns the mastermind for one-based `world_number`.
    #[must_use]
    pub fn mastermind_for_world(&self, world_number: u32) -> Option<&Mastermind> {
        let index = usize::try_from(world_number.checked_sub(1)?).ok()?;
        self.masterminds.get(index)
    }

    /// Returns every lesson id of the course, in order.
    #[must_use]
    pub fn lesson_ids(&self) -> Vec<String> {
        self.masterminds
            .iter()
            .flat_map(Mastermind::lesson_ids)
            .collect()
    }
}

/// A world as known to the backend: an ordered list of lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mastermind {
    /// Mastermind identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Subtitle.
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Lessons, in backend order (not necessarily `order_index` order).
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Mastermind {
    /// Returns the lesson ids in backend order.
    #[must_use]
    pub fn lesson_ids(&self) -> Vec<String> {
        self.lessons.iter().map(|l| l.id.clone()).collect()
    }
}

/// Declared media type of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// Audio lesson.
    Audio,
    /// Video lesson.
    Video,
    /// Text lesson.
    Text,
}

/// Explicit slot tag a remote lesson may carry instead of relying on order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotTag {
    /// Overrides `sun_content`.
    Sun,
    /// Overrides `moon_content`.
    Moon,
    /// Overrides `golden_thread`.
    GoldenThread,
    /// Becomes an extra module.
    Extra,
}

/// A lesson (module).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson identifier; this is the module id recorded in progress.
    pub id: String,
    /// Title override.
    #[serde(default)]
    pub title: Option<String>,
    /// Body override: plain text, or markup.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared media type.
    pub media_type: MediaType,
    /// Display duration, e.g. "12 min".
    #[serde(default)]
    pub duration: Option<String>,
    /// Output label shown on completion.
    #[serde(default)]
    pub output_label: Option<String>,
    /// Sort key used to align lessons with static slots.
    #[serde(default)]
    pub order_index: Option<i32>,
    /// Video reference override.
    #[serde(default)]
    pub video_url: Option<String>,
    /// Resource list override.
    #[serde(default)]
    pub resources: Vec<Download>,
    /// Explicit slot tag.
    #[serde(default)]
    pub slot: Option<SlotTag>,
}

impl Lesson {
    /// Creates a text lesson with only an id; handy for building records.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            media_type: MediaType::Text,
            duration: None,
            output_label: None,
            order_index: None,
            video_url: None,
            resources: Vec::new(),
            slot: None,
        }
    }
}
