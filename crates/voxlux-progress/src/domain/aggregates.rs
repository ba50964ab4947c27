//! Aggregate roots for the progress context.

use std::collections::BTreeSet;

use uuid::Uuid;
use voxlux_core::aggregate::AggregateRoot;
use voxlux_core::clock::Clock;
use voxlux_core::event::EventMetadata;

use super::events::{
    MODULES_COMPLETED_EVENT_TYPE, ModulesCompleted, ProgressEvent, ProgressEventKind,
};

/// The aggregate root for one learner's progress. The aggregate id is the
/// learner's user id.
#[derive(Debug)]
pub struct LearnerProgress {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Completed module ids. Only ever grows.
    pub(crate) completed: BTreeSet<String>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<ProgressEvent>,
}

impl LearnerProgress {
    /// Creates an empty progress record.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            completed: BTreeSet::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Completed module ids, sorted.
    #[must_use]
    pub fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    /// Completes `module_ids`, producing a `ModulesCompleted` event for the
    /// ids not already completed. Produces nothing when all are known.
    pub fn complete_modules(&mut self, module_ids: &[String], correlation_id: Uuid, clock: &dyn Clock) {
        let mut fresh: Vec<String> = Vec::new();
        for id in module_ids {
            if !self.completed.contains(id) && !fresh.contains(id) {
                fresh.push(id.clone());
            }
        }
        if fresh.is_empty() {
            return;
        }

        let event = ProgressEvent {
            metadata: EventMetadata::for_command(
                MODULES_COMPLETED_EVENT_TYPE,
                self.id,
                self.next_sequence_number(),
                correlation_id,
                clock,
            ),
            kind: ProgressEventKind::ModulesCompleted(ModulesCompleted {
                user_id: self.id,
                module_ids: fresh,
            }),
        };

        self.uncommitted_events.push(event);
    }
}

impl AggregateRoot for LearnerProgress {
    type Event = ProgressEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            ProgressEventKind::ModulesCompleted(payload) => {
                self.completed.extend(payload.module_ids.iter().cloned());
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
