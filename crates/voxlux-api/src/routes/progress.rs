//! Routes for the progress context.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use voxlux_progress::application::query_handlers::ProgressView;
use voxlux_progress::application::{command_handlers, query_handlers};
use voxlux_progress::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{user_id}/complete.
#[derive(Debug, Deserialize)]
pub struct CompleteModulesRequest {
    /// Module ids to record as completed.
    pub module_ids: Vec<String>,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// IDs of the domain events produced and persisted. Empty when every
    /// module was already completed.
    pub event_ids: Vec<Uuid>,
}

/// GET /{user_id}
#[instrument(skip(state))]
async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProgressView>, ApiError> {
    let view = query_handlers::get_progress(user_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// POST /{user_id}/complete
#[instrument(skip(state, request), fields(modules = request.module_ids.len()))]
async fn complete_modules(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<CompleteModulesRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CompleteModules::new(user_id, request.module_ids);
    info!(correlation_id = %command.correlation_id, "recording completed modules");

    let stored_events = command_handlers::handle_complete_modules(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    let event_ids = stored_events.iter().map(|e| e.event_id).collect();

    Ok(Json(CommandResponse { event_ids }))
}

/// Returns the router for the progress context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(get_progress))
        .route("/{user_id}/complete", post(complete_modules))
}
