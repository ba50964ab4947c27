//! Content Merger: overlays a remote mastermind record onto static world
//! content.
//!
//! Lessons are sorted by `order_index` (absent counts as 0, ties keep
//! backend order) and mapped by position: lesson 0 overrides the sun slot,
//! 1 the moon slot, 2 the golden thread, 3 and beyond replace the extra
//! modules. When every lesson carries an explicit [`SlotTag`] the tags are
//! used instead of positions.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::domain::course::{Lesson, Mastermind, SlotTag};
use crate::domain::world::{ContentSlot, SlotBody, WorldContent};

/// Number of canonical slots (sun, moon, golden thread).
pub const CANONICAL_SLOTS: usize = 3;

// Constant pattern; construction cannot fail.
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(\s[^<>]*)?/?>").expect("HTML tag pattern is valid")
});

/// Returns true when `text` looks like markup rather than plain text.
#[must_use]
pub fn looks_like_markup(text: &str) -> bool {
    HTML_TAG.is_match(text)
}

/// Classifies a remote body as plain text or long text.
#[must_use]
pub fn classify_body(text: &str) -> SlotBody {
    if looks_like_markup(text) {
        SlotBody::LongText(text.to_owned())
    } else {
        SlotBody::Plain(text.to_owned())
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Applies one lesson's overrides to a slot. Absent fields leave the slot
/// untouched; a non-empty resource list replaces the downloads wholesale.
fn apply_lesson(slot: &mut ContentSlot, lesson: &Lesson) {
    if let Some(title) = non_empty(lesson.title.as_ref()) {
        title.clone_into(&mut slot.title);
    }
    if let Some(body) = non_empty(lesson.description.as_ref()) {
        slot.body = classify_body(body);
    }
    if let Some(video) = non_empty(lesson.video_url.as_ref()) {
        slot.video = Some(video.to_owned());
    }
    if !lesson.resources.is_empty() {
        slot.downloads.clone_from(&lesson.resources);
    }
}

/// Builds an extra module from a lesson.
fn extra_from_lesson(lesson: &Lesson) -> ContentSlot {
    let mut slot = ContentSlot {
        title: String::new(),
        body: SlotBody::Plain(String::new()),
        video: None,
        downloads: Vec::new(),
    };
    apply_lesson(&mut slot, lesson);
    slot
}

/// Returns the lessons sorted by `order_index`; the sort is stable.
fn sorted_lessons(remote: &Mastermind) -> Vec<&Lesson> {
    let mut lessons: Vec<&Lesson> = remote.lessons.iter().collect();
    lessons.sort_by_key(|l| l.order_index.unwrap_or(0));

    let mut seen = HashSet::new();
    if lessons
        .iter()
        .any(|l| !seen.insert(l.order_index.unwrap_or(0)))
    {
        warn!(
            mastermind_id = %remote.id,
            "remote lessons share an order_index; slot mapping follows backend order for ties"
        );
    }
    lessons
}

fn merge_positional(merged: &mut WorldContent, lessons: &[&Lesson]) {
    let modules = &mut merged.dual_modules;
    let canonical = [
        &mut modules.sun_content,
        &mut modules.moon_content,
        &mut modules.golden_thread,
    ];
    for (slot, lesson) in canonical.into_iter().zip(lessons.iter()) {
        apply_lesson(slot, lesson);
    }

    if lessons.len() > CANONICAL_SLOTS {
        merged.extra_modules = lessons[CANONICAL_SLOTS..]
            .iter()
            .map(|l| extra_from_lesson(l))
            .collect();
    }
}

fn merge_tagged(merged: &mut WorldContent, remote: &Mastermind, lessons: &[&Lesson]) {
    let mut used = HashSet::new();
    let mut extras = Vec::new();

    for lesson in lessons {
        let Some(tag) = lesson.slot else { continue };
        if tag == SlotTag::Extra {
            extras.push(extra_from_lesson(lesson));
            continue;
        }
        if !used.insert(tag) {
            warn!(
                mastermind_id = %remote.id,
                lesson_id = %lesson.id,
                ?tag,
                "duplicate slot tag ignored"
            );
            continue;
        }
        let slot = match tag {
            SlotTag::Sun => &mut merged.dual_modules.sun_content,
            SlotTag::Moon => &mut merged.dual_modules.moon_content,
            SlotTag::GoldenThread | SlotTag::Extra => &mut merged.dual_modules.golden_thread,
        };
        apply_lesson(slot, lesson);
    }

    if !extras.is_empty() {
        merged.extra_modules = extras;
    }
}

/// Merges `remote` onto a copy of `static_content`.
///
/// Returns an independent value; the static content is never modified.
/// With no remote record the result equals the input.
#[must_use]
pub fn merge(static_content: &WorldContent, remote: Option<&Mastermind>) -> WorldContent {
    let mut merged = static_content.clone();
    let Some(remote) = remote else {
        return merged;
    };
    if remote.lessons.is_empty() {
        return merged;
    }

    let lessons = sorted_lessons(remote);
    if lessons.iter().all(|l| l.slot.is_some()) {
        merge_tagged(&mut merged, remote, &lessons);
    } else {
        merge_positional(&mut merged, &lessons);
    }
    merged
}
