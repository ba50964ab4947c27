//! Route modules, one per context.

pub mod diploma;
pub mod health;
pub mod progress;
pub mod quizzes;
pub mod settings;
pub mod world_sessions;
pub mod worlds;
