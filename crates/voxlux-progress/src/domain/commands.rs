//! Commands for the progress context.

use uuid::Uuid;
use voxlux_core::command::Command;

/// Records modules as completed for one learner. Ids already completed are
/// ignored by the handler.
#[derive(Debug, Clone)]
pub struct CompleteModules {
    pub correlation_id: Uuid,
    /// The learner, also the progress stream id.
    pub user_id: Uuid,
    pub module_ids: Vec<String>,
}

impl CompleteModules {
    /// A command under a fresh correlation id.
    #[must_use]
    pub fn new(user_id: Uuid, module_ids: Vec<String>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            user_id,
            module_ids,
        }
    }
}

impl Command for CompleteModules {
    fn command_type(&self) -> &'static str {
        "progress.complete_modules"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
