//! Backup Engine - Runs one backup of an account
//!
//! Lists the account's repositories, drops forks when asked to, and hands
//! every remaining repository to the [`MirrorSynchronizer`], one at a time.
//! A listing failure aborts the run before any mirror is touched; a mirror
//! failure is recorded and the run moves on to the next repository.

use anyhow::Result;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::ListingError;
use crate::git::{GitClient, MirrorTool};
use crate::github::{GitHubClient, RepositoryDescriptor};
use crate::mirror::{MirrorMode, MirrorSynchronizer};

/// Aggregate result of one backup run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Repositories the account owns
    pub total_repositories: usize,
    /// Repositories whose mirror was created or refreshed
    pub synchronized: Vec<String>,
    /// Forks left out by fork exclusion
    pub skipped: Vec<String>,
    /// Repositories whose mirror could not be created or refreshed
    pub failed: Vec<String>,
}

impl RunOutcome {
    /// True when no repository failed
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Repositories handed to the synchronizer
    pub fn attempted(&self) -> usize {
        self.synchronized.len() + self.failed.len()
    }
}

/// One line of a dry run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMirror {
    pub name: String,
    pub target: PathBuf,
    pub mode: MirrorMode,
}

/// What a run would do, computed without running the mirror tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPlan {
    /// Repositories that would be created or refreshed, in listing order
    pub mirrors: Vec<PlannedMirror>,
    /// Repositories a run would count as failed because of their name
    pub unusable: Vec<String>,
}

/// Mirror directory of repository `name` below `base_directory`.
///
/// `None` when the name is not a single plain path component, so a
/// malformed name can never point outside the base directory.
pub fn mirror_path(base_directory: &Path, name: &str) -> Option<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(base_directory.join(name)),
        _ => None,
    }
}

/// Orchestrates listing and mirroring for one account
pub struct BackupEngine<T> {
    github: GitHubClient,
    synchronizer: MirrorSynchronizer<T>,
    base_directory: PathBuf,
    exclude_forks: bool,
}

impl BackupEngine<GitClient> {
    /// Engine using the git command line as configured
    pub fn from_config(config: &Config, base_directory: &Path) -> Result<Self> {
        let github = GitHubClient::new(config)?;
        let tool = GitClient::new(&config.git);

        Ok(Self::new(
            github,
            tool,
            base_directory,
            config.backup.exclude_forks,
        ))
    }
}

impl<T: MirrorTool> BackupEngine<T> {
    pub fn new(github: GitHubClient, tool: T, base_directory: &Path, exclude_forks: bool) -> Self {
        Self {
            github,
            synchronizer: MirrorSynchronizer::new(tool),
            base_directory: base_directory.to_path_buf(),
            exclude_forks,
        }
    }

    pub fn synchronizer(&self) -> &MirrorSynchronizer<T> {
        &self.synchronizer
    }

    /// List the account and synchronize every selected repository.
    ///
    /// Only listing errors are returned; mirror failures end up in
    /// [`RunOutcome::failed`].
    pub async fn run(&self, account: &str) -> Result<RunOutcome, ListingError> {
        let repositories = self.github.list_repositories(account).await?;
        Ok(self.synchronize_all(repositories).await)
    }

    /// Synchronize already listed repositories, in order
    pub async fn synchronize_all(&self, repositories: Vec<RepositoryDescriptor>) -> RunOutcome {
        let mut outcome = RunOutcome {
            total_repositories: repositories.len(),
            ..Default::default()
        };

        let (selected, skipped) = self.select(repositories);
        outcome.skipped = skipped;

        for repo in selected {
            println!("creating backup from {}", repo.name);
            debug!("Creating backup from {}", repo.name);

            let succeeded = match mirror_path(&self.base_directory, &repo.name) {
                Some(target) => self.synchronizer.synchronize(&repo.clone_url, &target).await,
                None => {
                    error!("Refusing repository with unusable name: {:?}", repo.name);
                    false
                }
            };

            if succeeded {
                outcome.synchronized.push(repo.name);
            } else {
                outcome.failed.push(repo.name);
            }
        }

        info!(
            "Backup finished: {} synchronized, {} failed, {} skipped",
            outcome.synchronized.len(),
            outcome.failed.len(),
            outcome.skipped.len()
        );

        outcome
    }

    /// List the account and report what a run would do, without running git
    pub async fn plan(&self, account: &str) -> Result<RunPlan, ListingError> {
        let repositories = self.github.list_repositories(account).await?;
        let (selected, _) = self.select(repositories);

        let mut plan = RunPlan::default();
        for repo in selected {
            match mirror_path(&self.base_directory, &repo.name) {
                Some(target) => plan.mirrors.push(PlannedMirror {
                    mode: MirrorMode::for_target(&target),
                    name: repo.name,
                    target,
                }),
                None => {
                    warn!("Repository with unusable name would fail: {:?}", repo.name);
                    plan.unusable.push(repo.name);
                }
            }
        }

        Ok(plan)
    }

    /// Split repositories into those to mirror and the names of skipped forks
    fn select(
        &self,
        repositories: Vec<RepositoryDescriptor>,
    ) -> (Vec<RepositoryDescriptor>, Vec<String>) {
        if !self.exclude_forks {
            return (repositories, Vec::new());
        }

        let (forks, selected): (Vec<_>, Vec<_>) =
            repositories.into_iter().partition(|repo| repo.is_fork);

        for fork in &forks {
            debug!("Excluding fork repository: {}", fork.name);
        }

        (selected, forks.into_iter().map(|fork| fork.name).collect())
    }
}
