//! Event envelope shared by every event-sourced context.
//!
//! A context defines its own payload enum and wraps it, together with an
//! [`EventMetadata`], in a type implementing [`DomainEvent`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;

/// Envelope fields carried by every event, persisted alongside its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Event id.
    pub event_id: Uuid,
    /// Routing name, e.g. `progress.modules_completed`.
    pub event_type: String,
    /// Stream the event belongs to.
    pub aggregate_id: Uuid,
    /// One-based position in the stream.
    pub sequence_number: i64,
    /// Request that led to the event.
    pub correlation_id: Uuid,
    /// Immediate cause; the command's correlation id for command-born events.
    pub causation_id: Uuid,
    /// When the event was recorded.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Metadata for a new event raised while handling a command, stamped
    /// with a fresh id and `clock`'s time.
    #[must_use]
    pub fn for_command(
        event_type: &str,
        aggregate_id: Uuid,
        sequence_number: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id,
            sequence_number,
            correlation_id,
            causation_id: correlation_id,
            occurred_at: clock.now(),
        }
    }
}

/// An event with its metadata.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Routing name of the payload variant.
    fn event_type(&self) -> &'static str;

    /// The payload as stored.
    fn to_payload(&self) -> serde_json::Value;

    /// The envelope.
    fn metadata(&self) -> &EventMetadata;
}
