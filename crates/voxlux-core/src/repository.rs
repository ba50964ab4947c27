//! Event stream persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::{DomainEvent, EventMetadata};

/// An event as persisted: envelope fields plus the JSON payload.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    /// Event id.
    pub event_id: Uuid,
    /// Stream the event belongs to.
    pub aggregate_id: Uuid,
    /// Routing name used to pick the payload type on load.
    pub event_type: String,
    /// Payload.
    pub payload: serde_json::Value,
    /// One-based position in the stream.
    pub sequence_number: i64,
    /// Request that led to the event.
    pub correlation_id: Uuid,
    /// Immediate cause.
    pub causation_id: Uuid,
    /// When the event was recorded.
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

impl StoredEvent {
    /// Flattens a domain event for storage.
    pub fn from_event<E: DomainEvent>(event: &E) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            aggregate_id: meta.aggregate_id,
            event_type: event.event_type().to_owned(),
            payload: event.to_payload(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            causation_id: meta.causation_id,
            occurred_at: meta.occurred_at,
        }
    }

    /// The envelope fields, for rebuilding a domain event on load.
    #[must_use]
    pub fn metadata(&self) -> EventMetadata {
        EventMetadata {
            event_id: self.event_id,
            event_type: self.event_type.clone(),
            aggregate_id: self.aggregate_id,
            sequence_number: self.sequence_number,
            correlation_id: self.correlation_id,
            causation_id: self.causation_id,
            occurred_at: self.occurred_at,
        }
    }
}

/// Append-only storage of event streams, one stream per aggregate id.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Loads a stream in sequence order. An unknown id is an empty stream.
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError>;

    /// Appends `events` if the stream is still at `expected_version`
    /// (its last sequence number, 0 when empty).
    ///
    /// # Errors
    ///
    /// `DomainError::ConcurrencyConflict` when the stream has moved on.
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;
}
