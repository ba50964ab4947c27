//! Test flag backend.

use std::sync::Mutex;

use async_trait::async_trait;
use voxlux_core::error::DomainError;
use voxlux_core::flags::{FlagBackend, FlagValues};

/// A flag backend held in memory. Writes can be made to fail.
#[derive(Debug, Default)]
pub struct InMemoryFlagBackend {
    stored: Mutex<Option<FlagValues>>,
    fail_saves: bool,
}

impl InMemoryFlagBackend {
    /// Creates a backend already holding `values`.
    #[must_use]
    pub fn with_values(values: FlagValues) -> Self {
        Self {
            stored: Mutex::new(Some(values)),
            fail_saves: false,
        }
    }

    /// Creates an empty backend whose saves always fail.
    #[must_use]
    pub fn with_failing_saves() -> Self {
        Self {
            stored: Mutex::new(None),
            fail_saves: true,
        }
    }

    /// Returns the last persisted snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored(&self) -> Option<FlagValues> {
        *self.stored.lock().unwrap()
    }
}

#[async_trait]
impl FlagBackend for InMemoryFlagBackend {
    async fn load(&self) -> Result<FlagValues, DomainError> {
        Ok(self.stored().unwrap_or_default())
    }

    async fn save(&self, values: &FlagValues) -> Result<(), DomainError> {
        if self.fail_saves {
            return Err(DomainError::Infrastructure("disk full".into()));
        }
        *self.stored.lock().unwrap() = Some(*values);
        Ok(())
    }
}
