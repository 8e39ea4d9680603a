//! Post-merge command - switch off a merged branch and tidy up

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use preen_core::{Config, GitRunner, PostMergeOutcome, PostMergeWorkflow};

use crate::console::{ConsoleLog, ConsoleNotifier, ConsolePicker};

/// Switch off a merged branch, sweep stale branches, and pull
#[derive(Args, Debug)]
pub struct PostMergeArgs {}

impl PostMergeArgs {
    /// Execute the post-merge command
    pub async fn execute(&self, config: &Config, workspace: &Path) -> anyhow::Result<()> {
        let log = Arc::new(ConsoleLog::new());
        let runner = GitRunner::new(config.git.path.clone(), log.clone());
        let picker = ConsolePicker::new();
        let notify = ConsoleNotifier;

        let workflow = PostMergeWorkflow::new(
            &runner,
            &picker,
            &notify,
            log.as_ref(),
            workspace,
            config.git.remote.clone(),
        );

        // A completed run already reported itself through the notifier
        if workflow.run()? == PostMergeOutcome::Cancelled {
            println!("Post-merge cancelled.");
        }

        Ok(())
    }
}
