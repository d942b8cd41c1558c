use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::process::ExitStatus;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, warn};

use crate::config::GitConfig;

/// Exit status of one mirror tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    code: Option<i32>,
}

impl ToolStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Process ended without an exit code (killed by a signal)
    pub fn terminated() -> Self {
        Self { code: None }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ToolStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// The two version-control operations a mirror needs.
///
/// `Err` means the tool could not be run at all; a tool that ran and failed
/// returns `Ok` with a non-zero [`ToolStatus`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MirrorTool: Send + Sync {
    /// Create a full mirror clone of `source` at `target`
    async fn create(&self, source: &str, target: &Path) -> Result<ToolStatus>;

    /// Refresh all remote-tracking data of the mirror at `context`
    async fn refresh(&self, context: &Path) -> Result<ToolStatus>;
}

/// [`MirrorTool`] backed by the git command line
#[derive(Debug, Clone)]
pub struct GitClient {
    binary: String,
    prune: bool,
}

impl GitClient {
    pub fn new(config: &GitConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            prune: config.prune,
        }
    }

    async fn run(&self, args: &[&str], current_dir: Option<&Path>) -> Result<ToolStatus> {
        debug!("Running {} {}", self.binary, args.join(" "));

        let mut command = AsyncCommand::new(&self.binary);
        command.args(args);
        if let Some(dir) = current_dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .with_context(|| format!("Failed to execute {} {}", self.binary, args[0]))?;

        let status = ToolStatus::from(output.status);
        if !status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} {} failed ({}): {}", self.binary, args[0], status, stderr.trim());
        }

        Ok(status)
    }
}

#[async_trait]
impl MirrorTool for GitClient {
    async fn create(&self, source: &str, target: &Path) -> Result<ToolStatus> {
        let target = target.to_string_lossy();
        self.run(&["clone", "--mirror", source, target.as_ref()], None)
            .await
    }

    async fn refresh(&self, context: &Path) -> Result<ToolStatus> {
        let mut args = vec!["remote", "update"];
        if self.prune {
            args.push("--prune");
        }
        self.run(&args, Some(context)).await
    }
}
