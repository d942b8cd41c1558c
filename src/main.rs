use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ghbackup::config::CloneMethod;
use ghbackup::mirror::MirrorMode;
use ghbackup::{BackupEngine, Config};

/// Clone all repositories of a GitHub user to create local backups and keep
/// those backups up to date.
#[derive(Parser)]
#[command(name = "ghbackup")]
#[command(version)]
struct Cli {
    /// GitHub username
    username: String,

    /// Target directory for the cloned repositories
    directory: PathBuf,

    /// Skip repositories that are forks
    #[arg(long)]
    exclude_forks: bool,

    /// Show what would be cloned or updated without running git
    #[arg(long)]
    dry_run: bool,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Which repository URL to mirror from
    #[arg(long, value_enum)]
    clone_method: Option<CloneMethod>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_logging(cli.verbose, &config.logging.level);
    info!("Starting ghbackup v{}", env!("CARGO_PKG_VERSION"));

    if !cli.directory.is_dir() {
        bail!("{} is not a directory", cli.directory.display());
    }

    let engine = BackupEngine::from_config(&config, &cli.directory)?;

    if cli.dry_run {
        return cmd_plan(&engine, &cli.username).await;
    }

    println!("fetching repository list");
    let outcome = engine.run(&cli.username).await?;

    println!(
        "{} repositories: {} backed up, {} failed, {} skipped",
        outcome.total_repositories,
        outcome.synchronized.len(),
        outcome.failed.len(),
        outcome.skipped.len()
    );

    if !outcome.success() {
        println!("could not backup all repositories");
        for name in &outcome.failed {
            println!("   ❌ {}", name);
        }
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool, level: &str) {
    let default_level = if verbose { "debug" } else { level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load configuration and apply command line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };

    if cli.exclude_forks {
        config.backup.exclude_forks = true;
    }
    if let Some(api_url) = &cli.api_url {
        config.github.api_url = api_url.clone();
    }
    if let Some(clone_method) = cli.clone_method {
        config.github.clone_method = clone_method;
    }

    Ok(config)
}

/// Print the create/update plan without touching any mirror
async fn cmd_plan<T: ghbackup::MirrorTool>(
    engine: &BackupEngine<T>,
    username: &str,
) -> Result<ExitCode> {
    let plan = engine.plan(username).await?;

    println!("Repositories ({}):", plan.mirrors.len() + plan.unusable.len());
    for planned in &plan.mirrors {
        let action = match planned.mode {
            MirrorMode::Create => "📥 clone ",
            MirrorMode::Update => "🔄 update",
        };
        println!("  {} {} -> {}", action, planned.name, planned.target.display());
    }
    for name in &plan.unusable {
        println!("  ❌ fail   {} (unusable repository name)", name);
    }

    Ok(ExitCode::SUCCESS)
}
