//! Domain events for the progress context.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voxlux_core::error::DomainError;
use voxlux_core::event::{DomainEvent, EventMetadata};
use voxlux_core::repository::StoredEvent;

/// Event type of [`ModulesCompleted`].
pub const MODULES_COMPLETED_EVENT_TYPE: &str = "progress.modules_completed";

/// Emitted when a learner completes modules not completed before.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulesCompleted {
    /// The learner.
    pub user_id: Uuid,
    /// Newly completed module ids.
    pub module_ids: Vec<String>,
}

/// Event payload variants for the progress context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProgressEventKind {
    /// Modules have been completed.
    ModulesCompleted(ModulesCompleted),
}

/// Domain event envelope for the progress context.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ProgressEventKind,
}

impl ProgressEvent {
    /// Decodes a stored progress event.
    ///
    /// # Errors
    ///
    /// `DomainError::Infrastructure` when the payload is not a known
    /// progress event.
    pub fn from_stored(stored: &StoredEvent) -> Result<Self, DomainError> {
        let kind = serde_json::from_value(stored.payload.clone()).map_err(|e| {
            DomainError::infrastructure(
                &format!("decoding {} #{}", stored.event_type, stored.sequence_number),
                e,
            )
        })?;
        Ok(Self {
            metadata: stored.metadata(),
            kind,
        })
    }
}

impl DomainEvent for ProgressEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            ProgressEventKind::ModulesCompleted(_) => MODULES_COMPLETED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("ProgressEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
