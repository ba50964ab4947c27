//! Per-world cosmetic descriptors.

use serde::{Deserialize, Serialize};

/// Colours, audio cue and narrative strings for one world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldTheme {
    /// Display name of the world.
    pub name: String,
    /// One-line narrative tagline.
    pub tagline: String,
    /// Primary colour, as a CSS hex string.
    pub primary_color: String,
    /// Accent colour, as a CSS hex string.
    pub accent_color: String,
    /// Identifier of the ambient audio cue.
    pub audio_cue: String,
}
