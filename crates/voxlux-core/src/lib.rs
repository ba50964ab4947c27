//! Shared domain abstractions for Vox Lux.
//!
//! Event sourcing plumbing for the progress context, the clock, the
//! shared error type and the process-wide flags. No infrastructure.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod flags;
pub mod repository;
