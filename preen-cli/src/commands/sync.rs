//! Sync and resume commands - rebase the current branch onto a chosen
//! upstream, and pick a paused sync back up after conflicts

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use preen_core::{git, Config, FileStateStore, GitRunner, SyncEngine, SyncOutcome};

use crate::console::{ConsoleLog, ConsoleNotifier, ConsolePicker};

/// Rebase the current branch onto a chosen upstream and push
#[derive(Args, Debug)]
pub struct SyncArgs {}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config: &Config, workspace: &Path) -> anyhow::Result<()> {
        let log = Arc::new(ConsoleLog::new());
        let runner = GitRunner::new(config.git.path.clone(), log.clone());
        let picker = ConsolePicker::new();
        let notify = ConsoleNotifier;

        let git_dir = git::resolve_git_dir(&runner, workspace)?;
        let store = FileStateStore::new(git_dir.join("preen"));

        let mut engine =
            SyncEngine::new(&runner, &store, &picker, &notify, log.as_ref(), workspace);

        // Every other outcome already reported itself through the notifier
        if engine.start()? == SyncOutcome::Cancelled {
            println!("Sync cancelled.");
        }

        Ok(())
    }
}

/// Resume a sync paused on conflicts or a rejected push
#[derive(Args, Debug)]
pub struct ResumeArgs {}

impl ResumeArgs {
    /// Execute the resume command
    pub async fn execute(&self, config: &Config, workspace: &Path) -> anyhow::Result<()> {
        let log = Arc::new(ConsoleLog::new());
        let runner = GitRunner::new(config.git.path.clone(), log.clone());
        let picker = ConsolePicker::new();
        let notify = ConsoleNotifier;

        let git_dir = git::resolve_git_dir(&runner, workspace)?;
        let store = FileStateStore::new(git_dir.join("preen"));

        let mut engine =
            SyncEngine::new(&runner, &store, &picker, &notify, log.as_ref(), workspace);

        // All outcomes report themselves through the notifier
        let _ = engine.resume()?;

        Ok(())
    }
}
