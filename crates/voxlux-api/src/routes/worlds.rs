//! Routes for world resolution.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;
use voxlux_core::flags::Flag;
use voxlux_progress::application::query_handlers;
use voxlux_world::resolver::ResolvedWorld;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /{course_id}/{theme_id}.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    /// Learner whose progress decides locking. Anonymous callers see only
    /// the first world unlocked.
    pub user_id: Option<Uuid>,
}

/// GET /{course_id}/{theme_id}
#[instrument(skip(state))]
async fn resolve_world(
    State(state): State<AppState>,
    Path((course_id, theme_id)): Path<(String, String)>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolvedWorld>, ApiError> {
    let completed: HashSet<String> = match query.user_id {
        Some(user_id) => query_handlers::get_progress(user_id, &*state.event_repository)
            .await?
            .completed_modules
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };

    let world = state
        .resolver
        .resolve(
            &course_id,
            &theme_id,
            &completed,
            state.flags.get(Flag::GodMode),
        )
        .await;

    Ok(Json(world))
}

/// Returns the router for world resolution.
pub fn router() -> Router<AppState> {
    Router::new().route("/{course_id}/{theme_id}", get(resolve_world))
}
