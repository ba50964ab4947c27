//! Routes for server-hosted world views.
//!
//! A session is one mounted `WorldView` plus the learner's progress cache.
//! World-complete events raised by the view are written to progress before
//! the response is returned. Sessions end on DELETE, on a failed quiz, or
//! when the idle sweep evicts them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use voxlux_core::error::DomainError;
use voxlux_core::flags::Flag;
use voxlux_world::stage::{QuizOutcome, Stage};
use voxlux_world::view::{WorldEvent, WorldView, WorldViewSnapshot};

use crate::error::ApiError;
use crate::sessions::{SessionHandle, WorldSession};
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct MountSessionRequest {
    /// The learner.
    pub user_id: Uuid,
    /// Course id.
    pub course_id: String,
    /// Theme id, e.g. `mondo_3`.
    pub theme_id: String,
}

/// Request body for POST /{id}/quiz-result.
#[derive(Debug, Deserialize)]
pub struct QuizResultRequest {
    /// Outcome of the quiz taken in this world.
    pub outcome: QuizOutcome,
}

/// A session's current state.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Session id.
    pub session_id: Uuid,
    /// The learner.
    pub user_id: Uuid,
    /// Completed module ids whose write has not landed yet.
    pub pending_modules: Vec<String>,
    /// The view.
    pub view: WorldViewSnapshot,
}

/// Response to an action that may raise a world event.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    /// The event raised, if any.
    pub event: Option<WorldEvent>,
    /// For a completion event: whether progress was written.
    pub progress_recorded: Option<bool>,
    /// The session after the action.
    pub session: SessionResponse,
}

/// Response to POST /{id}/back.
#[derive(Debug, Serialize)]
pub struct BackResponse {
    /// Whether the stage moved.
    pub moved: bool,
    /// The session after the action.
    pub session: SessionResponse,
}

fn describe(session_id: Uuid, session: &WorldSession) -> SessionResponse {
    SessionResponse {
        session_id,
        user_id: session.user_id,
        pending_modules: session.progress.pending().iter().cloned().collect(),
        view: session.view.snapshot(),
    }
}

fn not_found(session_id: Uuid) -> ApiError {
    ApiError(DomainError::NotFound(format!("world session {session_id}")))
}

/// Writes a completion event through the session's progress cache.
async fn record(session: &mut WorldSession, event: Option<&WorldEvent>) -> Option<bool> {
    match event {
        Some(WorldEvent::Completed {
            world_number,
            module_ids,
            ..
        }) => {
            let recorded = session.progress.mark_completed(module_ids).await;
            info!(world_number, recorded, "world completed");
            Some(recorded)
        }
        Some(WorldEvent::Exited { world_number, .. }) => {
            info!(world_number, "world exited");
            None
        }
        None => None,
    }
}

/// POST /
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn mount_session(
    State(state): State<AppState>,
    Json(request): Json<MountSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let mut progress = state.progress_cache(request.user_id);
    progress.load().await?;
    let completed = progress.completed();
    let god_mode = state.flags.get(Flag::GodMode);

    let world = state
        .resolver
        .resolve(&request.course_id, &request.theme_id, &completed, god_mode)
        .await;
    if !world.unlocked {
        return Err(ApiError(DomainError::Validation(format!(
            "world {} of {} is locked",
            world.world_number, request.course_id
        ))));
    }

    let view = WorldView::mount_resolved(world, state.quizzes.clone(), state.view_config);
    let session = WorldSession::new(request.user_id, view, progress);

    let session_id = Uuid::new_v4();
    let response = describe(session_id, &session);
    state.sessions.insert(session_id, session).await;
    info!(%session_id, "world session mounted");

    Ok((StatusCode::CREATED, Json(response)))
}

async fn find_session(state: &AppState, session_id: Uuid) -> Result<SessionHandle, ApiError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| not_found(session_id))
}

/// GET /{id}
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = find_session(&state, session_id).await?;
    let session = handle.lock().await;
    Ok(Json(describe(session_id, &session)))
}

/// POST /{id}/advance
#[instrument(skip(state))]
async fn advance(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let handle = find_session(&state, session_id).await?;
    let mut session = handle.lock().await;
    session.touch();

    let event = session.view.advance().await;
    let progress_recorded = record(&mut session, event.as_ref()).await;

    Ok(Json(ActionResponse {
        event,
        progress_recorded,
        session: describe(session_id, &session),
    }))
}

/// POST /{id}/back
#[instrument(skip(state))]
async fn back(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<BackResponse>, ApiError> {
    let handle = find_session(&state, session_id).await?;
    let mut session = handle.lock().await;
    session.touch();

    let moved = session.view.back();

    Ok(Json(BackResponse {
        moved,
        session: describe(session_id, &session),
    }))
}

/// POST /{id}/quiz-result
///
/// A `passed` outcome is only accepted when the learner has a stored
/// passing result for the world's quiz. A `failed` outcome exits the world
/// and ends the session.
#[instrument(skip(state, request), fields(outcome = ?request.outcome))]
async fn quiz_result(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<QuizResultRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let handle = find_session(&state, session_id).await?;
    let mut session = handle.lock().await;
    session.touch();

    let snapshot = session.view.snapshot();
    if request.outcome == QuizOutcome::Passed
        && snapshot.stage == Stage::QuizActive
        && let Some(quiz) = &snapshot.quiz
        && !state
            .quizzes
            .has_passing_result(session.user_id, quiz.quiz_id)
            .await?
    {
        warn!(quiz_id = %quiz.quiz_id, "passed outcome without a passing result");
        return Err(ApiError(DomainError::Validation(format!(
            "no passing result for quiz {}",
            quiz.quiz_id
        ))));
    }

    let event = session.view.quiz_result(request.outcome);
    let progress_recorded = record(&mut session, event.as_ref()).await;
    if matches!(event, Some(WorldEvent::Exited { .. })) {
        state.sessions.remove(session_id).await;
        session.close().await;
        info!(%session_id, "world session ended");
    }

    Ok(Json(ActionResponse {
        event,
        progress_recorded,
        session: describe(session_id, &session),
    }))
}

/// DELETE /{id}
///
/// Unmounts the view and makes one last attempt at pending progress
/// writes.
#[instrument(skip(state))]
async fn unmount_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let handle = state
        .sessions
        .remove(session_id)
        .await
        .ok_or_else(|| not_found(session_id))?;
    handle.lock().await.close().await;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for world sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(mount_session))
        .route("/{id}", get(get_session).delete(unmount_session))
        .route("/{id}/advance", post(advance))
        .route("/{id}/back", post(back))
        .route("/{id}/quiz-result", post(quiz_result))
}
