//! Sweep command - delete local branches whose upstream is gone

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use preen_core::{Config, GitRunner, PickItem, Picker, SweepEngine, SweepMode, SweepOutcome};

use crate::console::{ConsoleLog, ConsoleNotifier, ConsolePicker};

/// Delete local branches whose upstream is gone
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Report what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Use `git branch -D` instead of the safe `-d`
    #[arg(short, long)]
    force: bool,
}

impl SweepArgs {
    /// Execute the sweep command
    pub async fn execute(&self, config: &Config, workspace: &Path) -> anyhow::Result<()> {
        let log = Arc::new(ConsoleLog::new());
        let runner = GitRunner::new(config.git.path.clone(), log.clone());
        let picker = ConsolePicker::new();
        let notify = ConsoleNotifier;

        let mode = match self.pick_mode(&picker, config) {
            Some(mode) => mode,
            None => {
                println!("Sweep cancelled.");
                return Ok(());
            }
        };

        let engine = SweepEngine::new(&runner, &picker, &notify, log.as_ref(), workspace);

        // Every other outcome already reported itself through the notifier
        if engine.run(mode)? == SweepOutcome::Cancelled {
            println!("Sweep cancelled.");
        }

        Ok(())
    }

    /// Pick the sweep mode from flags, or interactively when none are given
    fn pick_mode(&self, picker: &dyn Picker, config: &Config) -> Option<SweepMode> {
        if self.dry_run || self.force {
            return Some(SweepMode {
                dry_run: self.dry_run,
                force_delete: self.force,
            });
        }

        let default_force = config.sweep.force_delete;
        let items = vec![
            PickItem::new("Delete (safe)").picked(!default_force),
            PickItem::new("Delete (force)").picked(default_force),
            PickItem::new("Dry run"),
        ];

        match picker.pick_one("How should swept branches be handled?", &items)? {
            0 => Some(SweepMode {
                dry_run: false,
                force_delete: false,
            }),
            1 => Some(SweepMode {
                dry_run: false,
                force_delete: true,
            }),
            _ => Some(SweepMode {
                dry_run: true,
                force_delete: false,
            }),
        }
    }
}
