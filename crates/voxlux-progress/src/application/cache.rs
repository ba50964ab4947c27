//! Read-through progress cache.
//!
//! The local set gives immediate feedback after a completion; the event
//! stream stays authoritative. Writes that fail are kept as pending and
//! retried by [`ProgressCache::reconcile`].

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use uuid::Uuid;
use voxlux_core::clock::Clock;
use voxlux_core::error::DomainError;
use voxlux_core::repository::EventRepository;

use crate::application::command_handlers::handle_complete_modules;
use crate::application::query_handlers::get_progress;
use crate::domain::commands::CompleteModules;

/// One learner's completion set: confirmed ids from the backend plus
/// optimistic ids whose write has not landed yet.
pub struct ProgressCache {
    user_id: Uuid,
    repo: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
    confirmed: BTreeSet<String>,
    pending: BTreeSet<String>,
}

impl std::fmt::Debug for ProgressCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressCache")
            .field("user_id", &self.user_id)
            .field("confirmed", &self.confirmed)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl ProgressCache {
    /// Creates an empty cache for `user_id`. Call [`ProgressCache::load`]
    /// before relying on it.
    #[must_use]
    pub fn new(user_id: Uuid, repo: Arc<dyn EventRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_id,
            repo,
            clock,
            confirmed: BTreeSet::new(),
            pending: BTreeSet::new(),
        }
    }

    /// The learner this cache belongs to.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Replaces the confirmed set with the backend's.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the backend cannot be read;
    /// the cache keeps its previous contents.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn load(&mut self) -> Result<(), DomainError> {
        let view = get_progress(self.user_id, self.repo.as_ref()).await?;
        self.confirmed = view.completed_modules;
        self.pending.retain(|id| !self.confirmed.contains(id));
        debug!(
            confirmed = self.confirmed.len(),
            pending = self.pending.len(),
            "progress loaded"
        );
        Ok(())
    }

    /// Whether `module_id` is completed, optimistically.
    #[must_use]
    pub fn contains(&self, module_id: &str) -> bool {
        self.confirmed.contains(module_id) || self.pending.contains(module_id)
    }

    /// The advisory completion set: confirmed and pending ids.
    #[must_use]
    pub fn completed(&self) -> HashSet<String> {
        self.confirmed.union(&self.pending).cloned().collect()
    }

    /// Ids whose write has not been confirmed.
    #[must_use]
    pub fn pending(&self) -> &BTreeSet<String> {
        &self.pending
    }

    /// Marks modules completed. The local set updates at once; a failed
    /// write is remembered as pending. Returns whether the write landed.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn mark_completed(&mut self, module_ids: &[String]) -> bool {
        let fresh: Vec<String> = module_ids
            .iter()
            .filter(|id| !self.confirmed.contains(*id))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return true;
        }

        match self.write(fresh.clone()).await {
            Ok(()) => {
                for id in &fresh {
                    self.pending.remove(id);
                }
                self.confirmed.extend(fresh);
                true
            }
            Err(e) => {
                warn!(error = %e, modules = fresh.len(), "progress write failed, keeping as pending");
                self.pending.extend(fresh);
                false
            }
        }
    }

    /// Retries pending writes, then reloads from the backend.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the retry or the reload fails; pending ids
    /// are kept in that case.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn reconcile(&mut self) -> Result<(), DomainError> {
        if !self.pending.is_empty() {
            let pending: Vec<String> = self.pending.iter().cloned().collect();
            self.write(pending).await?;
            self.pending.clear();
        }
        self.load().await
    }

    async fn write(&self, module_ids: Vec<String>) -> Result<(), DomainError> {
        let command = CompleteModules::new(self.user_id, module_ids);
        handle_complete_modules(&command, self.clock.as_ref(), self.repo.as_ref())
            .await
            .map(|_| ())
    }
}
