//! Local recovery file
//!
//! Holds the last committed state so an interrupted session can be resumed.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash never leaves a half-written document behind.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CardResult;
use crate::model::CardState;

#[derive(Debug, Clone)]
pub struct RecoveryFile {
    path: PathBuf,
}

impl RecoveryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location inside a data directory
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join("recovery.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Atomically replace the stored state
    pub fn write(&self, state: &CardState) -> CardResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes())?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = ?self.path, bytes = json.len(), "Recovery state written");
        Ok(())
    }

    /// Stored state, `None` when nothing was written yet.
    ///
    /// A document that fails validation is an integrity error.
    pub fn read(&self) -> CardResult<Option<CardState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        let state = CardState::from_json(&json)?;
        info!(path = ?self.path, "Recovered card state");
        Ok(Some(state))
    }

    pub fn clear(&self) -> CardResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
