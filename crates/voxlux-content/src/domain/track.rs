//! Course tracks and the view each one is presented with.

use serde::{Deserialize, Serialize};

/// One of the two course tracks that carry static world content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// The storytelling course.
    Storytelling,
    /// The podcasting course.
    Podcast,
}

impl Track {
    /// Returns the stable external name of the track.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Storytelling => "storytelling",
            Self::Podcast => "podcast",
        }
    }

    /// Returns the prefix this track's theme ids carry (`mondo_7`, `pod_3`).
    #[must_use]
    pub fn theme_prefix(self) -> &'static str {
        match self {
            Self::Storytelling => "mondo",
            Self::Podcast => "pod",
        }
    }
}

/// The immersive view a presentation layer mounts for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Branching narrative tree (storytelling).
    NarrativeTree,
    /// Orbital constellation (podcast).
    Orbital,
    /// Flat lesson list, used for every other course.
    StandardList,
}

impl ViewKind {
    /// Maps an optional track to its view. Total: no track means the
    /// standard list.
    #[must_use]
    pub fn for_track(track: Option<Track>) -> Self {
        match track {
            Some(Track::Storytelling) => Self::NarrativeTree,
            Some(Track::Podcast) => Self::Orbital,
            None => Self::StandardList,
        }
    }
}

/// Maps backend course identifiers onto tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMap {
    storytelling_course_id: String,
    podcast_course_id: String,
}

impl TrackMap {
    /// Creates a map from the two track course identifiers.
    #[must_use]
    pub fn new(storytelling_course_id: impl Into<String>, podcast_course_id: impl Into<String>) -> Self {
        Self {
            storytelling_course_id: storytelling_course_id.into(),
            podcast_course_id: podcast_course_id.into(),
        }
    }

    /// Returns the track for `course_id`, if it is one of the two tracks.
    #[must_use]
    pub fn track_for(&self, course_id: &str) -> Option<Track> {
        if course_id == self.storytelling_course_id {
            Some(Track::Storytelling)
        } else if course_id == self.podcast_course_id {
            Some(Track::Podcast)
        } else {
            None
        }
    }

    /// Returns the view kind for `course_id`.
    #[must_use]
    pub fn view_kind(&self, course_id: &str) -> ViewKind {
        ViewKind::for_track(self.track_for(course_id))
    }
}

impl Default for TrackMap {
    fn default() -> Self {
        Self::new("storytelling", "podcast")
    }
}
