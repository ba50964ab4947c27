//! Application layer for the quiz context.

pub mod service;
