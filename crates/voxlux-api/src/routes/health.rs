//! Liveness endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use voxlux_content::domain::track::Track;

use crate::state::AppState;

/// Body of GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Hash of the bundled world content, to tell deployments apart.
    pub content_version: String,
    pub storytelling_worlds: usize,
    pub podcast_worlds: usize,
    /// Worlds currently mounted by learners.
    pub open_sessions: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.resolver.registry();
    let open_sessions = state.sessions.len().await;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        content_version: registry.version_hash().to_owned(),
        storytelling_worlds: registry.world_count(Track::Storytelling),
        podcast_worlds: registry.world_count(Track::Podcast),
        open_sessions,
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
