//! Mounted world sessions.
//!
//! The registry map is only locked long enough to look a session up. Work
//! on a session, including progress writes, happens under that session's
//! own lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;
use voxlux_progress::application::cache::ProgressCache;
use voxlux_world::view::WorldView;

/// A world view mounted on behalf of one learner.
#[derive(Debug)]
pub struct WorldSession {
    /// The learner.
    pub user_id: Uuid,
    /// The mounted view.
    pub view: WorldView,
    /// The learner's completion set; world completions are written here.
    pub progress: ProgressCache,
    last_active: Instant,
}

impl WorldSession {
    /// Creates a session, active as of now.
    #[must_use]
    pub fn new(user_id: Uuid, view: WorldView, progress: ProgressCache) -> Self {
        Self {
            user_id,
            view,
            progress,
            last_active: Instant::now(),
        }
    }

    /// Marks the session as used.
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// How long the session has gone unused as of `now`.
    #[must_use]
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_active)
    }

    /// Unmounts the view and makes one last attempt at pending progress
    /// writes.
    pub async fn close(&mut self) {
        self.view.unmount();
        if !self.progress.pending().is_empty()
            && let Err(e) = self.progress.reconcile().await
        {
            warn!(
                error = %e,
                user_id = %self.user_id,
                pending = self.progress.pending().len(),
                "progress still pending at unmount"
            );
        }
    }
}

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<WorldSession>>;

/// Mounted world sessions by id.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, SessionHandle>>>,
}

impl SessionRegistry {
    /// Registers a freshly mounted session.
    pub async fn insert(&self, session_id: Uuid, session: WorldSession) {
        self.sessions
            .lock()
            .await
            .insert(session_id, Arc::new(Mutex::new(session)));
    }

    /// Looks a session up. The registry lock is released on return.
    pub async fn get(&self, session_id: Uuid) -> Option<SessionHandle> {
        self.sessions.lock().await.get(&session_id).cloned()
    }

    /// Removes a session; the caller is expected to close it.
    pub async fn remove(&self, session_id: Uuid) -> Option<SessionHandle> {
        self.sessions.lock().await.remove(&session_id)
    }

    /// Number of mounted sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no session is mounted.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Evicts and closes every session idle for at least `idle_ttl` as of
    /// `now`. Sessions busy with a request are skipped. Returns the number
    /// evicted.
    pub async fn sweep(&self, now: Instant, idle_ttl: Duration) -> usize {
        let expired: Vec<SessionHandle> = {
            let mut sessions = self.sessions.lock().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, handle)| {
                    handle
                        .try_lock()
                        .is_ok_and(|session| session.idle_for(now) >= idle_ttl)
                })
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        let evicted = expired.len();
        for handle in expired {
            handle.lock().await.close().await;
        }
        if evicted > 0 {
            info!(evicted, "idle world sessions evicted");
        }
        evicted
    }
}

/// Spawns the periodic idle-session sweep.
#[must_use]
pub fn spawn_sweeper(sessions: SessionRegistry, idle_ttl: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            sessions.sweep(Instant::now(), idle_ttl).await;
        }
    })
}
