//! Routes for the process-wide flags.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use voxlux_core::flags::{Flag, FlagValues};

use crate::error::ApiError;
use crate::state::AppState;

/// A single flag's value.
#[derive(Debug, Serialize)]
pub struct FlagResponse {
    /// Flag name.
    pub flag: Flag,
    /// Current value.
    pub value: bool,
}

/// Request body for PUT /{flag}.
#[derive(Debug, Deserialize)]
pub struct SetFlagRequest {
    /// New value.
    pub value: bool,
}

/// Response body for PUT /{flag}.
#[derive(Debug, Serialize)]
pub struct SetFlagResponse {
    /// Flag name.
    pub flag: Flag,
    /// Value now in effect.
    pub value: bool,
    /// Whether the value reached durable storage.
    pub persisted: bool,
}

/// GET /
async fn all_flags(State(state): State<AppState>) -> Json<FlagValues> {
    Json(state.flags.snapshot())
}

/// GET /{flag}
async fn get_flag(
    State(state): State<AppState>,
    Path(flag): Path<String>,
) -> Result<Json<FlagResponse>, ApiError> {
    let flag: Flag = flag.parse()?;
    Ok(Json(FlagResponse {
        flag,
        value: state.flags.get(flag),
    }))
}

/// PUT /{flag}
///
/// The new value takes effect even when it cannot be persisted.
#[instrument(skip(state, request), fields(value = request.value))]
async fn set_flag(
    State(state): State<AppState>,
    Path(flag): Path<String>,
    Json(request): Json<SetFlagRequest>,
) -> Result<Json<SetFlagResponse>, ApiError> {
    let flag: Flag = flag.parse()?;
    let persisted = match state.flags.set(flag, request.value).await {
        Ok(()) => true,
        Err(e) => {
            warn!(%flag, error = %e, "flag not persisted");
            false
        }
    };
    info!(%flag, persisted, "flag set");

    Ok(Json(SetFlagResponse {
        flag,
        value: state.flags.get(flag),
        persisted,
    }))
}

/// Returns the router for flags.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(all_flags))
        .route("/{flag}", get(get_flag).put(set_flag))
}
