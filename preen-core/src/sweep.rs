//! Stale-branch sweep
//!
//! Finds local branches whose upstream is gone, offers them for deletion
//! (all pre-checked), and deletes each one independently so a single
//! failure never blocks the rest.

use std::path::PathBuf;

use crate::git::{parse_gone_branches, GitCli};
use crate::ui::{LogSink, Notifier, PickItem, Picker};
use crate::Result;

/// How a sweep should behave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepMode {
    /// Report what would be deleted without issuing any delete commands
    pub dry_run: bool,
    /// Use `git branch -D` instead of the safe `-d`
    pub force_delete: bool,
}

/// Aggregate result of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// No gone branches found
    Clean,
    /// The user cancelled the selection or kept every branch
    Cancelled,
    /// Dry run: this many branches would have been deleted
    WouldDelete(usize),
    /// Deletions ran; some may have failed
    Deleted {
        /// Branches deleted successfully
        deleted: usize,
        /// Branches whose deletion failed (details in the log)
        failed: usize,
    },
}

/// The stale-branch sweep engine
pub struct SweepEngine<'a> {
    git: &'a dyn GitCli,
    picker: &'a dyn Picker,
    notify: &'a dyn Notifier,
    log: &'a dyn LogSink,
    workspace: PathBuf,
}

impl std::fmt::Debug for SweepEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepEngine")
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

impl<'a> SweepEngine<'a> {
    /// Create a sweep engine for the given workspace and collaborators
    pub fn new(
        git: &'a dyn GitCli,
        picker: &'a dyn Picker,
        notify: &'a dyn Notifier,
        log: &'a dyn LogSink,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            git,
            picker,
            notify,
            log,
            workspace: workspace.into(),
        }
    }

    /// Run a sweep in the given mode
    pub fn run(&self, mode: SweepMode) -> Result<SweepOutcome> {
        self.git.run(&["fetch", "-p"], &self.workspace)?;

        let listing = self.git.run(&["branch", "-vv"], &self.workspace)?;
        let gone = parse_gone_branches(&listing.stdout);

        if gone.is_empty() {
            self.notify
                .info("No branches with a gone upstream were found.");
            return Ok(SweepOutcome::Clean);
        }

        let items: Vec<PickItem> = gone
            .iter()
            .map(|name| PickItem::new(name.clone()).picked(true))
            .collect();

        let Some(selection) = self
            .picker
            .pick_many("Select branches to delete (upstream gone)", &items)
        else {
            return Ok(SweepOutcome::Cancelled);
        };
        if selection.is_empty() {
            return Ok(SweepOutcome::Cancelled);
        }

        let chosen: Vec<&str> = selection
            .iter()
            .filter_map(|&i| gone.get(i).map(String::as_str))
            .collect();

        if mode.dry_run {
            self.notify.info(&format!(
                "Dry run: {} branch(es) would be deleted.",
                chosen.len()
            ));
            return Ok(SweepOutcome::WouldDelete(chosen.len()));
        }

        let flag = if mode.force_delete { "-D" } else { "-d" };
        let mut deleted = 0;
        let mut failed = 0;

        for name in &chosen {
            match self.git.run(&["branch", flag, name], &self.workspace) {
                Ok(_) => deleted += 1,
                Err(e) => {
                    failed += 1;
                    self.log.line(&format!("[delete-failed] {}: {}", name, e));
                }
            }
        }

        if failed == 0 {
            self.notify
                .info(&format!("Deleted {} branch(es).", deleted));
        } else {
            self.notify.info(&format!(
                "Deleted {}/{} branch(es); see the log for details.",
                deleted,
                chosen.len()
            ));
        }

        Ok(SweepOutcome::Deleted { deleted, failed })
    }
}
