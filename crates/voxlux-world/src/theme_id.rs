//! World number extraction from theme identifiers.

use std::sync::LazyLock;

use regex::Regex;
use voxlux_content::domain::track::Track;

// Constant pattern; construction cannot fail.
static THEME_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(mondo|pod)[_-]?(\d{1,3})$").expect("theme id pattern is valid")
});

/// Extracts the world number from a theme id such as `mondo_7` or `pod_3`.
///
/// A tracked course only accepts its own prefix, so `pod_3` names no world
/// of the storytelling track. Untracked courses accept either prefix.
/// Anything that does not match yields 0, which has no content.
#[must_use]
pub fn world_number(track: Option<Track>, theme_id: &str) -> u32 {
    let Some(captures) = THEME_ID.captures(theme_id) else {
        return 0;
    };
    let prefix = captures.get(1).map_or("", |m| m.as_str());
    if track.is_some_and(|t| t.theme_prefix() != prefix) {
        return 0;
    }
    captures
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
