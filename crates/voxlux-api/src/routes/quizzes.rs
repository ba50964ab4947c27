//! Routes for the quiz context.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;
use voxlux_quiz::application::service::SubmissionOutcome;
use voxlux_quiz::domain::quiz::{PublicQuiz, Quiz};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{quiz_id}/submit.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// The learner.
    pub user_id: Uuid,
    /// Selected option index per question; `null` for unanswered.
    pub answers: Vec<Option<usize>>,
}

/// GET /by-module/{module_id}
///
/// Responds `null` when the module has no (valid) quiz.
#[instrument(skip(state))]
async fn quiz_for_module(
    State(state): State<AppState>,
    Path(module_id): Path<String>,
) -> Result<Json<Option<PublicQuiz>>, ApiError> {
    let quiz = state.quizzes.load_quiz(&module_id).await?;
    Ok(Json(quiz.as_ref().map(Quiz::to_public)))
}

/// POST /{quiz_id}/submit
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn submit(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmissionOutcome>, ApiError> {
    let outcome = state
        .quizzes
        .submit_answers(request.user_id, quiz_id, &request.answers)
        .await?;
    Ok(Json(outcome))
}

/// Returns the router for the quiz context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/by-module/{module_id}", get(quiz_for_module))
        .route("/{quiz_id}/submit", post(submit))
}
