//! Mirror synchronization: create a missing mirror, refresh an existing one.
//!
//! The decision is made from the presence of the target directory alone.
//! Mirror contents are never inspected.

use std::path::Path;
use tracing::{error, info};

use crate::git::{MirrorTool, ToolStatus};
use crate::workdir::WorkingDirectory;

/// What [`MirrorSynchronizer::synchronize`] will do for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorMode {
    /// No directory yet: clone a fresh mirror
    Create,
    /// Directory present: refresh it in place
    Update,
}

impl MirrorMode {
    /// Decide create-vs-update for `target`.
    ///
    /// OPEN QUESTION: an existing directory is assumed to be a mirror from an
    /// earlier run. A half-created or foreign directory is refreshed as if it
    /// were valid, and that refresh fails instead of re-cloning. A cheap
    /// validity check (e.g. `git rev-parse --is-bare-repository`) would close
    /// the gap but changes which repositories get re-cloned.
    pub fn for_target(target: &Path) -> Self {
        if target.is_dir() {
            MirrorMode::Update
        } else {
            MirrorMode::Create
        }
    }
}

/// Keeps one local mirror per repository in step with its remote
pub struct MirrorSynchronizer<T> {
    tool: T,
}

impl<T: MirrorTool> MirrorSynchronizer<T> {
    pub fn new(tool: T) -> Self {
        Self { tool }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Ensure a mirror of `clone_url` exists at `target` and is up to date.
    ///
    /// Returns whether the tool reported success. Failures are logged here
    /// and never raised, so one repository cannot stop the run.
    pub async fn synchronize(&self, clone_url: &str, target: &Path) -> bool {
        match MirrorMode::for_target(target) {
            MirrorMode::Create => self.create(clone_url, target).await,
            MirrorMode::Update => self.update(target).await,
        }
    }

    async fn create(&self, clone_url: &str, target: &Path) -> bool {
        info!("Creating mirror of {} at {}", clone_url, target.display());

        // No rollback: after a failed clone the target is left as git left
        // it. git removes its own partial clone, but a directory that
        // survives would be treated as a mirror on the next run.
        let outcome = self.tool.create(clone_url, target).await;
        Self::classify(outcome, "could not create mirror", target)
    }

    async fn update(&self, target: &Path) -> bool {
        info!("Updating mirror at {}", target.display());

        let workdir = match WorkingDirectory::enter(target) {
            Ok(workdir) => workdir,
            Err(e) => {
                error!("could not update {}: {:#}", target.display(), e);
                return false;
            }
        };

        let outcome = self.tool.refresh(workdir.path()).await;
        drop(workdir);

        Self::classify(outcome, "could not update", target)
    }

    fn classify(outcome: anyhow::Result<ToolStatus>, failure: &str, target: &Path) -> bool {
        match outcome {
            Ok(status) if status.success() => true,
            Ok(status) => {
                error!("{} {} ({})", failure, target.display(), status);
                false
            }
            Err(e) => {
                error!("{} {}: {:#}", failure, target.display(), e);
                false
            }
        }
    }
}
