//! Domain layer for the quiz context.

pub mod attempt;
pub mod quiz;
pub mod result;
pub mod store;
