//! JSON file backing for the process-wide flags.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};
use voxlux_core::error::DomainError;
use voxlux_core::flags::{FlagBackend, FlagValues};

/// Stores [`FlagValues`] as a JSON document on disk.
///
/// A missing file reads as the defaults. Saves go to a sibling temp file
/// that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct FileFlagBackend {
    path: PathBuf,
}

impl FileFlagBackend {
    /// Creates a backend for `path`. Nothing is touched until the first
    /// load or save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FlagBackend for FileFlagBackend {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<FlagValues, DomainError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no flag file, using defaults");
                return Ok(FlagValues::default());
            }
            Err(e) => return Err(DomainError::infrastructure("reading flags", e)),
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::infrastructure("parsing flags", e))
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn save(&self, values: &FlagValues) -> Result<(), DomainError> {
        let json = serde_json::to_vec_pretty(values)
            .map_err(|e| DomainError::infrastructure("encoding flags", e))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| DomainError::infrastructure("writing flags", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| DomainError::infrastructure("replacing flags", e))?;
        debug!("flags saved");
        Ok(())
    }
}
