//! ghbackup - Mirror every repository of a GitHub account
//!
//! ghbackup lists all repositories owned by an account and keeps one local
//! `git clone --mirror` of each up to date: missing mirrors are created,
//! existing ones are refreshed with `git remote update`.
//!
//! ## Modules
//!
//! - [`github`]: paginated repository listing
//! - [`mirror`]: create-or-update decision for a single mirror
//! - [`git`]: the mirror tool interface and its git implementation
//! - [`workdir`]: scoped working-directory changes
//! - [`sync`]: the backup run over all repositories
//! - [`config`]: configuration management and parsing
//! - [`error`]: listing errors

pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod mirror;
pub mod sync;
pub mod workdir;

pub use config::Config;
pub use error::ListingError;
pub use git::{GitClient, MirrorTool, ToolStatus};
pub use github::{GitHubClient, RepositoryDescriptor};
pub use mirror::{MirrorMode, MirrorSynchronizer};
pub use sync::{BackupEngine, RunOutcome, RunPlan};
pub use workdir::WorkingDirectory;
