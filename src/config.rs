use anyhow::{Context, Result};
use dirs::config_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure for ghbackup
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// GitHub API and discovery settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Backup selection settings
    #[serde(default)]
    pub backup: BackupConfig,

    /// Settings for the git executable
    #[serde(default)]
    pub git: GitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which URL of a repository entry is handed to `git clone --mirror`
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CloneMethod {
    /// git:// protocol (`git_url`)
    #[default]
    Git,
    /// HTTPS (`clone_url`)
    Https,
    /// SSH (`ssh_url`)
    Ssh,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubConfig {
    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// User-Agent sent with every API request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Page size requested from the API; the API default when unset
    #[serde(default)]
    pub per_page: Option<u32>,

    #[serde(default)]
    pub clone_method: CloneMethod,
}

/// Backup selection configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackupConfig {
    /// Skip repositories flagged as forks
    #[serde(default)]
    pub exclude_forks: bool,
}

/// Git executable configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GitConfig {
    /// Path or name of the git binary
    #[serde(default = "default_git_binary")]
    pub binary: String,

    /// Pass --prune to `git remote update`
    #[serde(default)]
    pub prune: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"
}

// Default value functions
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_user_agent() -> String {
    format!("ghbackup/{}", env!("CARGO_PKG_VERSION"))
}
fn default_git_binary() -> String {
    "git".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations
impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            per_page: None,
            clone_method: CloneMethod::default(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: default_git_binary(),
            prune: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load_or_default() -> Result<Self> {
        match Self::default_config_path() {
            Ok(config_path) if config_path.exists() => Self::load(&config_path),
            _ => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        // Expand environment variables in paths
        config.expand_paths()?;

        Ok(config)
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("ghbackup").join("config.yml"))
    }

    /// Expand `~` and environment variables in the git binary path
    pub fn expand_paths(&mut self) -> Result<()> {
        self.git.binary = shellexpand::full(&self.git.binary)
            .context("Failed to expand git binary path")?
            .into_owned();

        Ok(())
    }

    /// URL of the repository list endpoint for an account
    pub fn repos_endpoint(&self, account: &str) -> String {
        format!(
            "{}/users/{}/repos",
            self.github.api_url.trim_end_matches('/'),
            account
        )
    }
}
