//! World context.
//!
//! Resolves a (course, theme) pair to the content and view a presentation
//! layer should mount, and drives each mounted world through its stages:
//! intro, the three canonical content slots, any extras, an optional quiz
//! and the final ritual.

pub mod resolver;
pub mod stage;
pub mod theme_id;
pub mod view;
