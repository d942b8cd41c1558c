//! Scoped change of the process working directory.
//!
//! The working directory is process-wide state. [`WorkingDirectory::enter`]
//! captures the current directory before switching, and the returned guard
//! switches back when dropped, whichever way the enclosing scope is left.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Guard holding the process inside a directory until dropped
#[derive(Debug)]
#[must_use = "the previous working directory is restored as soon as the guard is dropped"]
pub struct WorkingDirectory {
    previous: PathBuf,
    current: PathBuf,
}

impl WorkingDirectory {
    /// Switch the process into `path`, remembering where it was
    pub fn enter(path: &Path) -> Result<Self> {
        let previous = env::current_dir().context("Failed to read current working directory")?;

        env::set_current_dir(path)
            .with_context(|| format!("Failed to enter directory: {}", path.display()))?;

        let mut guard = Self {
            previous,
            current: path.to_path_buf(),
        };

        // Resolved after the switch so a relative `path` is never applied twice
        guard.current = env::current_dir().context("Failed to read entered directory")?;

        debug!("Entered {} (was {})", guard.current.display(), guard.previous.display());

        Ok(guard)
    }

    /// Absolute directory the guard switched into
    pub fn path(&self) -> &Path {
        &self.current
    }
}

impl Drop for WorkingDirectory {
    fn drop(&mut self) {
        match env::set_current_dir(&self.previous) {
            Ok(()) => debug!("Restored working directory {}", self.previous.display()),
            Err(e) => error!(
                "Failed to restore working directory {}: {}",
                self.previous.display(),
                e
            ),
        }
    }
}
