//! Application layer for the progress context.

pub mod cache;
pub mod command_handlers;
pub mod diploma;
pub mod query_handlers;
