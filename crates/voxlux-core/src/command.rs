//! Commands: requests to change an aggregate.

use uuid::Uuid;

/// A request handled by a command handler.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable name, e.g. `progress.complete_modules`. Logged with every
    /// handled command.
    fn command_type(&self) -> &'static str;

    /// Id correlating the command with the events it causes.
    fn correlation_id(&self) -> Uuid;
}
