//! Query handlers for the progress context.
//!
//! This module contains query handlers that reconstitute aggregates
//! from stored events and return read-only view DTOs.

use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;
use voxlux_core::error::DomainError;
use voxlux_core::repository::EventRepository;

use crate::application::command_handlers;

/// Read-only view of a learner's progress.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    /// The learner.
    pub user_id: Uuid,
    /// Completed module ids, sorted.
    pub completed_modules: BTreeSet<String>,
    /// Current version (event count).
    pub version: i64,
}

/// Retrieves a learner's progress. A learner with no history has an empty
/// completion set.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if events cannot be loaded or
/// deserialized.
pub async fn get_progress(
    user_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<ProgressView, DomainError> {
    let stored_events = repo.load_events(user_id).await?;
    let progress = command_handlers::reconstitute(user_id, &stored_events)?;
    Ok(ProgressView {
        user_id,
        completed_modules: progress.completed,
        version: progress.version,
    })
}

/// floor(100 * |completed ∩ required| / |required|); 0 when nothing is
/// required. Only a fully completed set reports 100.
#[must_use]
pub fn completion_percent(completed: &BTreeSet<String>, required: &[String]) -> u8 {
    let required: BTreeSet<&String> = required.iter().collect();
    if required.is_empty() {
        return 0;
    }
    let done = required.iter().filter(|id| completed.contains(**id)).count();
    let total = required.len();
    u8::try_from(100 * done / total).unwrap_or(100)
}
