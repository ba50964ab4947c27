//! Routes for the diploma gate.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;
use voxlux_progress::application::diploma::Eligibility;

use crate::state::AppState;

/// Query string for GET /{course_id}/diploma.
#[derive(Debug, Deserialize)]
pub struct DiplomaQuery {
    /// The learner.
    pub user_id: Uuid,
}

/// GET /{course_id}/diploma
///
/// Always 200: failures are reported as a degraded, ineligible result.
#[instrument(skip(state))]
async fn diploma(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(query): Query<DiplomaQuery>,
) -> Json<Eligibility> {
    Json(state.diploma.is_eligible(&course_id, query.user_id).await)
}

/// Returns the router for course-level endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/{course_id}/diploma", get(diploma))
}
