//! Command handlers for the progress context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load aggregate, execute command, persist events.

use tracing::{debug, instrument};
use uuid::Uuid;
use voxlux_core::aggregate::AggregateRoot;
use voxlux_core::clock::Clock;
use voxlux_core::command::Command;
use voxlux_core::error::DomainError;
use voxlux_core::repository::{EventRepository, StoredEvent};

use crate::domain::aggregates::LearnerProgress;
use crate::domain::commands::CompleteModules;
use crate::domain::events::ProgressEvent;

/// Reconstitutes a `LearnerProgress` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    user_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<LearnerProgress, DomainError> {
    let mut progress = LearnerProgress::new(user_id);
    for stored in existing_events {
        progress.apply(&ProgressEvent::from_stored(stored)?);
    }
    Ok(progress)
}

/// Handles the `CompleteModules` command: reconstitutes the learner's
/// progress, records the modules not yet completed, and persists the
/// resulting events. Completing known modules persists nothing.
///
/// # Errors
///
/// Returns `DomainError::Validation` if no module id is given or one is
/// blank, and `DomainError` if event loading or appending fails.
#[instrument(skip(clock, repo), fields(command = command.command_type(), user_id = %command.user_id))]
pub async fn handle_complete_modules(
    command: &CompleteModules,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    if command.module_ids.is_empty() {
        return Err(DomainError::Validation(
            "at least one module id is required".into(),
        ));
    }
    if command.module_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(DomainError::Validation(
            "module ids must not be empty".into(),
        ));
    }

    let existing_events = repo.load_events(command.user_id).await?;
    let mut progress = reconstitute(command.user_id, &existing_events)?;

    progress.complete_modules(&command.module_ids, command.correlation_id, clock);

    let stored_events: Vec<StoredEvent> = progress
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_event)
        .collect();
    debug!(events = stored_events.len(), "modules recorded");

    if !stored_events.is_empty() {
        repo.append_events(command.user_id, progress.version(), &stored_events)
            .await?;
    }

    Ok(stored_events)
}
