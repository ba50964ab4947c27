//! HTTP API.
//!
//! Exposes world resolution, world sessions, quizzes, progress, the
//! diploma gate and the process-wide flags over JSON.

pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod telemetry;

use axum::Router;

use crate::state::AppState;

/// Builds the application router without transport layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/worlds", routes::worlds::router())
        .nest("/api/v1/world-sessions", routes::world_sessions::router())
        .nest("/api/v1/quizzes", routes::quizzes::router())
        .nest("/api/v1/progress", routes::progress::router())
        .nest("/api/v1/courses", routes::diploma::router())
        .nest("/api/v1/settings", routes::settings::router())
        .with_state(state)
}
