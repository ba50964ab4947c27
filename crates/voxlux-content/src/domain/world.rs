//! Static world content.

use serde::{Deserialize, Serialize};

use super::track::Track;

/// A downloadable resource attached to a content slot or lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    /// Human-readable label.
    pub label: String,
    /// Resource location.
    pub url: String,
}

/// One structured block of a segmented body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Optional block heading.
    #[serde(default)]
    pub heading: Option<String>,
    /// Block text.
    pub text: String,
}

/// The body of a content slot. Renderers must handle every kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SlotBody {
    /// Plain text.
    Plain(String),
    /// Markup ("long text"), already HTML.
    LongText(String),
    /// Structured segments.
    Segments(Vec<Segment>),
}

/// A single content unit: one of the three canonical slots or an extra.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSlot {
    /// Slot title.
    pub title: String,
    /// Slot body.
    pub body: SlotBody,
    /// Optional video reference.
    #[serde(default)]
    pub video: Option<String>,
    /// Downloadable resources.
    #[serde(default)]
    pub downloads: Vec<Download>,
}

/// The three canonical, positionally meaningful slots of a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualModules {
    /// Slot 0. Its body is the technical content.
    pub sun_content: ContentSlot,
    /// Slot 1. Its body is the psychological content.
    pub moon_content: ContentSlot,
    /// Slot 2. Its body is the synthesis exercise.
    pub golden_thread: ContentSlot,
}

/// Addresses one content unit of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "slot", content = "index", rename_all = "snake_case")]
pub enum SlotRef {
    /// `sun_content`.
    Sun,
    /// `moon_content`.
    Moon,
    /// `golden_thread`.
    GoldenThread,
    /// `extra_modules[index]`.
    Extra(usize),
}

/// The authoritative content payload of one world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldContent {
    /// Stable identifier. Doubles as the world's module id when the backend
    /// has no lessons for it.
    pub id: String,
    /// Owning track.
    pub track: Track,
    /// One-based world number.
    pub world_number: u32,
    /// World title.
    pub title: String,
    /// Narrative intro.
    pub intro: String,
    /// Narrative outro.
    pub outro: String,
    /// The sun / moon / golden-thread slots.
    pub dual_modules: DualModules,
    /// Content beyond the three canonical slots.
    #[serde(default)]
    pub extra_modules: Vec<ContentSlot>,
}

impl WorldContent {
    /// Returns the slot addressed by `slot_ref`.
    #[must_use]
    pub fn slot(&self, slot_ref: SlotRef) -> Option<&ContentSlot> {
        match slot_ref {
            SlotRef::Sun => Some(&self.dual_modules.sun_content),
            SlotRef::Moon => Some(&self.dual_modules.moon_content),
            SlotRef::GoldenThread => Some(&self.dual_modules.golden_thread),
            SlotRef::Extra(index) => self.extra_modules.get(index),
        }
    }
}
