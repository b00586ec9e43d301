//! Anonymous session identity.
//!
//! The session id is the only thing that ties a user's comments and votes
//! together. It is created once, stored under `CANDOR_HOME`, and then passed
//! explicitly to whatever needs it (API client, TUI state).

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use uuid::Uuid;

/// Anonymous session identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Loads the session id stored at `path`, creating one if missing.
    ///
    /// A file that exists but does not hold a valid UUID is an error; it is
    /// never overwritten here.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read session id from {}", path.display()))?;
            let uuid = Uuid::parse_str(contents.trim()).with_context(|| {
                format!(
                    "Invalid session id in {} (run `candor session reset`)",
                    path.display()
                )
            })?;
            return Ok(Self(uuid));
        }

        let id = Self::generate();
        id.save(path)?;
        info!(path = %path.display(), "created new anonymous session");
        Ok(id)
    }

    /// Replaces the stored session id with a fresh one.
    pub fn reset(path: &Path) -> Result<Self> {
        let id = Self::generate();
        id.save(path)?;
        info!(path = %path.display(), "anonymous session reset");
        Ok(id)
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, format!("{}\n", self.0))
            .with_context(|| format!("Failed to write session id to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
