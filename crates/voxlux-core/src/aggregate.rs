//! Event-sourced aggregates.

use uuid::Uuid;

use crate::event::DomainEvent;

/// State rebuilt by folding a stream of events.
///
/// Command methods on an aggregate never mutate state directly: they push
/// events to the uncommitted list, and state only changes through
/// [`AggregateRoot::apply`] once those events are read back.
pub trait AggregateRoot: Send + Sync {
    /// Event envelope of this aggregate's stream.
    type Event: DomainEvent;

    /// Stream id.
    fn aggregate_id(&self) -> Uuid;

    /// Events applied so far.
    fn version(&self) -> i64;

    /// Folds one event into the state.
    fn apply(&mut self, event: &Self::Event);

    /// Events raised since the last load, not yet persisted.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Forgets raised events once they are stored.
    fn clear_uncommitted_events(&mut self);

    /// Sequence number for the next raised event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version() + self.uncommitted_events().len() as i64 + 1
    }
}
