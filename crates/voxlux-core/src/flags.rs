//! Process-wide presentation flags.
//!
//! Flags such as "audio enabled" or "god mode" are read once from a
//! [`FlagBackend`] when the [`FlagService`] is initialised, written through
//! to the backend on every change, and broadcast to subscribers.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::DomainError;

/// Capacity of the change channel. Slow subscribers observe `Lagged`.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// A named process-wide flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// Ambient audio and audio cues.
    AudioEnabled,
    /// Unlocks every world regardless of progress.
    GodMode,
}

impl Flag {
    /// Returns the stable external name of the flag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AudioEnabled => "audio_enabled",
            Self::GodMode => "god_mode",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio_enabled" => Ok(Self::AudioEnabled),
            "god_mode" => Ok(Self::GodMode),
            other => Err(DomainError::NotFound(format!("flag {other}"))),
        }
    }
}

/// Persisted snapshot of every flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagValues {
    /// Whether audio is enabled.
    #[serde(default = "default_audio_enabled")]
    pub audio_enabled: bool,
    /// Whether god mode is on.
    #[serde(default)]
    pub god_mode: bool,
}

fn default_audio_enabled() -> bool {
    true
}

impl Default for FlagValues {
    fn default() -> Self {
        Self {
            audio_enabled: default_audio_enabled(),
            god_mode: false,
        }
    }
}

impl FlagValues {
    /// Reads a single flag.
    #[must_use]
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::AudioEnabled => self.audio_enabled,
            Flag::GodMode => self.god_mode,
        }
    }

    fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::AudioEnabled => self.audio_enabled = value,
            Flag::GodMode => self.god_mode = value,
        }
    }
}

/// A flag change broadcast to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagChange {
    /// The flag that changed.
    pub flag: Flag,
    /// Its new value.
    pub value: bool,
}

/// Durable storage for flag values.
#[async_trait]
pub trait FlagBackend: Send + Sync {
    /// Loads the persisted flags. A backend with nothing stored returns the
    /// defaults.
    async fn load(&self) -> Result<FlagValues, DomainError>;

    /// Persists the full flag snapshot.
    async fn save(&self, values: &FlagValues) -> Result<(), DomainError>;
}

/// Injectable flag service: `get`, `set`, `on_change`.
pub struct FlagService {
    values: RwLock<FlagValues>,
    backend: Arc<dyn FlagBackend>,
    changes: broadcast::Sender<FlagChange>,
}

impl fmt::Debug for FlagService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagService")
            .field("values", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl FlagService {
    /// Initialises the service, reading the backend exactly once. A failing
    /// backend yields the defaults.
    pub async fn init(backend: Arc<dyn FlagBackend>) -> Self {
        let values = match backend.load().await {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "failed to load persisted flags, using defaults");
                FlagValues::default()
            }
        };
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: RwLock::new(values),
            backend,
            changes,
        }
    }

    /// Returns the current value of `flag`.
    #[must_use]
    pub fn get(&self, flag: Flag) -> bool {
        self.snapshot().get(flag)
    }

    /// Returns every flag value.
    #[must_use]
    pub fn snapshot(&self) -> FlagValues {
        *self
            .values
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Sets `flag` and writes the snapshot through to the backend.
    ///
    /// The in-memory value and the broadcast happen before the write, so
    /// readers see the new value even when persistence fails.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the backend write fails.
    pub async fn set(&self, flag: Flag, value: bool) -> Result<(), DomainError> {
        let (changed, snapshot) = {
            let mut values = self
                .values
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let changed = values.get(flag) != value;
            values.set(flag, value);
            (changed, *values)
        };

        if changed {
            debug!(%flag, value, "flag changed");
            // No receivers is fine; nobody is listening yet.
            let _ = self.changes.send(FlagChange { flag, value });
        }

        self.backend.save(&snapshot).await
    }

    /// Subscribes to flag changes.
    #[must_use]
    pub fn on_change(&self) -> broadcast::Receiver<FlagChange> {
        self.changes.subscribe()
    }
}
