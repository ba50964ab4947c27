//! Domain types for the content context.

pub mod course;
pub mod store;
pub mod theme;
pub mod track;
pub mod world;
