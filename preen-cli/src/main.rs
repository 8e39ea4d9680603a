//! Preen CLI - Command line interface for preen
//!
//! Keeps feature branches rebased on their upstream and sweeps away
//! branches whose remote counterpart is gone.

mod commands;
mod console;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use preen_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PostMergeArgs, ResumeArgs, SweepArgs, SyncArgs};

/// Preen: resumable branch sync and stale-branch sweep for git
#[derive(Parser, Debug)]
#[command(name = "preen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    workspace: Option<PathBuf>,

    /// Path to the git executable (overrides config and env)
    #[arg(long, global = true, env = "PREEN_GIT_PATH")]
    git_path: Option<String>,

    /// Preferred remote (overrides config and env)
    #[arg(long, global = true, env = "PREEN_REMOTE")]
    remote: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Rebase the current branch onto a chosen upstream and push
    #[command(visible_alias = "s")]
    Sync(SyncArgs),

    /// Resume a sync paused on conflicts or a rejected push
    #[command(visible_alias = "r")]
    Resume(ResumeArgs),

    /// Delete local branches whose upstream is gone
    #[command(visible_alias = "sw")]
    Sweep(SweepArgs),

    /// Switch off a merged branch and tidy up
    #[command(name = "post-merge")]
    PostMerge(PostMergeArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.git_path.clone(), cli.remote.clone())?;

    if cli.verbose {
        tracing::info!(
            git_path = %config.git.path,
            remote = %config.git.remote,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("preen {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Sync(args)) => {
            let workspace = resolve_workspace(cli.workspace)?;
            args.execute(&config, &workspace).await?;
        }
        Some(Commands::Resume(args)) => {
            let workspace = resolve_workspace(cli.workspace)?;
            args.execute(&config, &workspace).await?;
        }
        Some(Commands::Sweep(args)) => {
            let workspace = resolve_workspace(cli.workspace)?;
            args.execute(&config, &workspace).await?;
        }
        Some(Commands::PostMerge(args)) => {
            let workspace = resolve_workspace(cli.workspace)?;
            args.execute(&config, &workspace).await?;
        }
        Some(Commands::Config) => {
            println!("Preen Configuration");
            println!("===================");
            println!();
            println!("Git Settings:");
            println!("  path:   {}", config.git.path);
            println!("  remote: {}", config.git.remote);
            println!();
            println!("Sweep Settings:");
            println!("  force_delete: {}", config.sweep.force_delete);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Preen - resumable branch sync and stale-branch sweep for git");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

/// Resolve the workspace directory the workflows operate on
fn resolve_workspace(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let path = match flag {
        Some(p) => p,
        None => std::env::current_dir().map_err(|_| preen_core::Error::NoWorkspace)?,
    };

    if !path.is_dir() {
        return Err(preen_core::Error::NoWorkspace.into());
    }

    Ok(path)
}
