//! Post-merge tidy-up workflow
//!
//! After a branch merges upstream: switch to the default branch, drop the
//! merged branch, sweep stale branches, and pull. A thin composition over
//! the command runner and the sweep engine.

use std::path::PathBuf;

use crate::git::{self, parse_branches, parse_gone_branches, BranchRecord, GitCli};
use crate::sweep::{SweepEngine, SweepMode};
use crate::ui::{LogSink, Notifier, PickItem, Picker};
use crate::{Error, Result};

/// Terminal result of the post-merge workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostMergeOutcome {
    /// Switched to the chosen branch and finished the tidy-up
    Completed {
        /// The branch now checked out
        switched_to: String,
    },
    /// The user cancelled at the branch prompt
    Cancelled,
}

struct SwitchCandidate {
    name: String,
    /// Set when no local branch exists and a tracking branch must be
    /// created from this remote ref
    remote_ref: Option<String>,
}

/// The post-merge workflow
pub struct PostMergeWorkflow<'a> {
    git: &'a dyn GitCli,
    picker: &'a dyn Picker,
    notify: &'a dyn Notifier,
    log: &'a dyn LogSink,
    workspace: PathBuf,
    preferred_remote: String,
}

impl std::fmt::Debug for PostMergeWorkflow<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostMergeWorkflow")
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

impl<'a> PostMergeWorkflow<'a> {
    /// Create the workflow for the given workspace and collaborators
    pub fn new(
        git: &'a dyn GitCli,
        picker: &'a dyn Picker,
        notify: &'a dyn Notifier,
        log: &'a dyn LogSink,
        workspace: impl Into<PathBuf>,
        preferred_remote: impl Into<String>,
    ) -> Self {
        Self {
            git,
            picker,
            notify,
            log,
            workspace: workspace.into(),
            preferred_remote: preferred_remote.into(),
        }
    }

    /// Run the workflow
    pub fn run(&self) -> Result<PostMergeOutcome> {
        self.git.run(&["fetch"], &self.workspace)?;

        let current = git::current_branch(self.git, &self.workspace)?;
        let listing = self.git.run(&["branch", "-a"], &self.workspace)?;
        let records = parse_branches(&listing.stdout);
        let verbose = self.git.run(&["branch", "-vv"], &self.workspace)?;
        let gone = parse_gone_branches(&verbose.stdout);

        let remote = self.discover_remote()?;
        let default_branch = self.default_branch(&remote, &records)?;

        let mut candidates: Vec<SwitchCandidate> = Vec::new();
        for r in records.iter().filter(|r| !r.is_remote) {
            candidates.push(SwitchCandidate {
                name: r.name.clone(),
                remote_ref: None,
            });
        }
        for r in records.iter().filter(|r| r.is_remote) {
            let Some((_, short)) = r.name.split_once('/') else {
                continue;
            };
            if short == current || candidates.iter().any(|c| c.name == short) {
                continue;
            }
            candidates.push(SwitchCandidate {
                name: short.to_string(),
                remote_ref: Some(r.name.clone()),
            });
        }

        let items: Vec<PickItem> = candidates
            .iter()
            .map(|c| {
                PickItem::new(c.name.clone())
                    .with_detail(if c.remote_ref.is_some() {
                        "remote only"
                    } else {
                        "local branch"
                    })
                    .picked(c.name == default_branch)
            })
            .collect();

        let gone_marker = if gone.iter().any(|g| g == &current) {
            " (gone)"
        } else {
            ""
        };
        let title = format!("Switch from {}{} to:", current, gone_marker);
        let Some(choice) = self.picker.pick_one(&title, &items) else {
            return Ok(PostMergeOutcome::Cancelled);
        };
        let chosen = candidates
            .get(choice)
            .ok_or_else(|| Error::Other(format!("selection index {} out of range", choice)))?;

        // Prefer the existing local branch; only create a tracking branch
        // when none exists. Never force: local commits stay intact.
        match &chosen.remote_ref {
            Some(remote_ref) => {
                self.git
                    .run(&["checkout", "-b", &chosen.name, remote_ref], &self.workspace)?;
            }
            None => {
                self.git.run(&["checkout", &chosen.name], &self.workspace)?;
            }
        }

        if let Err(e) = self.git.run(&["branch", "-d", &current], &self.workspace) {
            self.log
                .line(&format!("[warn] could not delete {}: {}", current, e));
        }

        // Safe delete only: force-deleting here could take unrelated
        // stale branches with it.
        let sweep = SweepEngine::new(self.git, self.picker, self.notify, self.log, &self.workspace);
        sweep.run(SweepMode {
            dry_run: false,
            force_delete: false,
        })?;

        if let Err(e) = self.git.run(&["pull"], &self.workspace) {
            let text = format!("{} {}", e, e.stderr).to_lowercase();
            if text.contains("no tracking information") {
                self.notify.info(&format!(
                    "{} has no upstream configured; skipping pull.",
                    chosen.name
                ));
            } else {
                return Err(e.into());
            }
        }

        self.notify
            .info(&format!("Switched to {} and tidied up.", chosen.name));
        Ok(PostMergeOutcome::Completed {
            switched_to: chosen.name.clone(),
        })
    }

    fn discover_remote(&self) -> Result<String> {
        let out = self.git.run(&["remote"], &self.workspace)?;
        let remotes: Vec<&str> = out.stdout.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

        if remotes.is_empty() {
            return Err(Error::Config(
                "No remotes configured. Add one with 'git remote add origin <url>'.".to_string(),
            ));
        }

        if remotes.iter().any(|r| *r == self.preferred_remote) {
            Ok(self.preferred_remote.clone())
        } else {
            Ok(remotes[0].to_string())
        }
    }

    /// The remote's default branch, from its symbolic HEAD pointer, with a
    /// main/master fallback when the pointer is unset
    fn default_branch(&self, remote: &str, records: &[BranchRecord]) -> Result<String> {
        let head_ref = format!("refs/remotes/{}/HEAD", remote);
        match self.git.run(&["symbolic-ref", &head_ref], &self.workspace) {
            Ok(out) => {
                let target = out.stdout.trim();
                let prefix = format!("refs/remotes/{}/", remote);
                if let Some(short) = target.strip_prefix(&prefix) {
                    return Ok(short.to_string());
                }
                Ok(target.rsplit('/').next().unwrap_or(target).to_string())
            }
            Err(e) => {
                self.log.line(&format!(
                    "[warn] {} has no symbolic HEAD ({}); falling back to main/master",
                    remote, e
                ));
                for fallback in ["main", "master"] {
                    if records.iter().any(|r| !r.is_remote && r.name == fallback) {
                        return Ok(fallback.to_string());
                    }
                }
                Err(Error::Config(format!(
                    "Could not determine the default branch for {}",
                    remote
                )))
            }
        }
    }
}
