//! The resumable sync-with-upstream engine
//!
//! Drives fetch, stash, rebase-target preparation, rebase, and
//! force-with-lease push for a selected upstream branch. Conflicts and
//! push rejections are expected pause states: they persist a memento and
//! exit cleanly so the run can be resumed later. Anything else funnels to
//! a best-effort restoration of the repository.

use std::path::{Path, PathBuf};

use crate::git::{self, parse_branches, rebase_state, BranchRecord, GitCli};
use crate::state::{self, StateStore, SyncMemento};
use crate::ui::{LogSink, Notifier, PickItem, Picker};
use crate::{Error, Result};

use super::phase::{PhaseTracker, SyncPhase};

/// Marker prefix in stash messages, so preen's own stashes can be found
/// again by scanning `git stash list`
pub(super) const STASH_MARKER: &str = "preen-sync autostash:";

const TEMP_BRANCH_PREFIX: &str = "preen/sync-";
const TEMP_BRANCH_MAX_LEN: usize = 80;

/// Terminal result of a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Rebase and push both succeeded
    Completed {
        /// The branch that was rebased and pushed
        feature_branch: String,
        /// The ref it was synced against
        upstream: String,
    },
    /// Rebase hit conflicts; a memento was persisted for resume
    ConflictPaused {
        /// The branch being rebased
        feature_branch: String,
        /// The ref it was being synced against
        upstream: String,
    },
    /// Push was rejected; a memento was persisted for retry
    PushRejected {
        /// The branch whose push failed
        feature_branch: String,
        /// The push failure text
        message: String,
    },
    /// No candidate branches to sync against
    NothingToSync,
    /// The user cancelled at the selection prompt
    Cancelled,
    /// A rebase is already in progress; the user must resume instead
    ResumeRequired,
}

/// State accumulated across one sync attempt, used both for the memento
/// and for restoring the repository when something unexpected fails
struct Attempt {
    feature_branch: String,
    target: BranchRecord,
    local_names: Vec<String>,
    has_stash: bool,
    temp_branch: Option<String>,
}

/// The sync-with-upstream workflow engine
pub struct SyncEngine<'a> {
    pub(super) git: &'a dyn GitCli,
    pub(super) store: &'a dyn StateStore,
    pub(super) picker: &'a dyn Picker,
    pub(super) notify: &'a dyn Notifier,
    pub(super) log: &'a dyn LogSink,
    pub(super) workspace: PathBuf,
    pub(super) phase: PhaseTracker,
}

impl std::fmt::Debug for SyncEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("workspace", &self.workspace)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<'a> SyncEngine<'a> {
    /// Create an engine for the given workspace and collaborators
    pub fn new(
        git: &'a dyn GitCli,
        store: &'a dyn StateStore,
        picker: &'a dyn Picker,
        notify: &'a dyn Notifier,
        log: &'a dyn LogSink,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            git,
            store,
            picker,
            notify,
            log,
            workspace: workspace.into(),
            phase: PhaseTracker::new(),
        }
    }

    /// Start a fresh sync of the current branch against a chosen upstream
    pub fn start(&mut self) -> Result<SyncOutcome> {
        let git_dir = git::resolve_git_dir(self.git, &self.workspace)?;

        // Entry guard: an outstanding sync, paused on a rebase or on a
        // rejected push, must be resumed before a new one may start
        let memento = state::load_memento(self.store)?;
        if rebase_state::rebase_in_progress(&git_dir) {
            self.notify.error(
                "A rebase is already in progress. Resolve it and run `preen resume` \
                 before starting a new sync.",
            );
            if let Some(m) = &memento {
                if let Ok(age) = m.saved_at.elapsed() {
                    self.notify.info(&format!(
                        "A sync of {} against {} was paused {} ago.",
                        m.feature_branch,
                        m.upstream_ref,
                        rough_age(age)
                    ));
                }
            }
            return Ok(SyncOutcome::ResumeRequired);
        }
        if let Some(m) = memento {
            let age = m
                .saved_at
                .elapsed()
                .map(rough_age)
                .unwrap_or_else(|_| "moments".to_string());
            self.notify.error(&format!(
                "A sync of {} against {} was paused {} ago. Run `preen resume` to \
                 finish it before starting a new one.",
                m.feature_branch, m.upstream_ref, age
            ));
            return Ok(SyncOutcome::ResumeRequired);
        }

        self.phase.advance(SyncPhase::Fetching)?;
        self.git.run(&["fetch", "-p"], &self.workspace)?;

        self.phase.advance(SyncPhase::SelectingTarget)?;
        let feature_branch = git::current_branch(self.git, &self.workspace)?;

        let listing = self.git.run(&["branch", "-a"], &self.workspace)?;
        let records = parse_branches(&listing.stdout);
        let local_names: Vec<String> = records
            .iter()
            .filter(|r| !r.is_remote)
            .map(|r| r.name.clone())
            .collect();
        let candidates: Vec<BranchRecord> = records
            .into_iter()
            .filter(|r| r.is_remote || r.name != feature_branch)
            .collect();

        if candidates.is_empty() {
            self.notify.info("No other branches to sync with.");
            self.phase.advance(SyncPhase::Idle)?;
            return Ok(SyncOutcome::NothingToSync);
        }

        let items: Vec<PickItem> = candidates
            .iter()
            .map(|r| {
                PickItem::new(r.name.clone()).with_detail(if r.is_remote {
                    "remote branch"
                } else {
                    "local branch"
                })
            })
            .collect();

        let title = format!("Rebase {} onto which branch?", feature_branch);
        let Some(choice) = self.picker.pick_one(&title, &items) else {
            self.phase.advance(SyncPhase::Idle)?;
            return Ok(SyncOutcome::Cancelled);
        };
        let target = candidates
            .get(choice)
            .cloned()
            .ok_or_else(|| Error::Other(format!("selection index {} out of range", choice)))?;

        let mut attempt = Attempt {
            feature_branch,
            target,
            local_names,
            has_stash: false,
            temp_branch: None,
        };

        match self.run_to_completion(&mut attempt, &git_dir) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.recover_after_failure(&attempt);
                Err(err)
            }
        }
    }

    fn run_to_completion(&mut self, attempt: &mut Attempt, git_dir: &Path) -> Result<SyncOutcome> {
        let status = self.git.run(&["status", "--porcelain"], &self.workspace)?;
        if !status.stdout.trim().is_empty() {
            self.phase.advance(SyncPhase::Stashing)?;
            let marker = stash_marker(&attempt.feature_branch);
            // A failed stash is not fatal: the user may still want the
            // sync, so proceed with the working tree as-is.
            match self.git.run(&["stash", "push", "-u", "-m", &marker], &self.workspace) {
                Ok(_) => attempt.has_stash = true,
                Err(e) => {
                    tracing::warn!(error = %e, "stash failed; continuing without stashing");
                    self.log
                        .line(&format!("[warn] could not stash local changes: {}", e));
                }
            }
        }

        self.phase.advance(SyncPhase::PreparingTarget)?;
        let rebase_target = if attempt.target.is_remote {
            // Snapshot the remote ref on a scratch branch so the rebase
            // target cannot move underneath us mid-operation.
            let temp = temp_branch_name(&attempt.target.name);
            self.git
                .run(&["checkout", "-b", &temp, &attempt.target.name], &self.workspace)?;
            attempt.temp_branch = Some(temp.clone());

            if let Some((remote, branch)) = attempt.target.name.split_once('/') {
                if let Err(e) = self.git.run(&["pull", remote, branch], &self.workspace) {
                    self.log
                        .line(&format!("[warn] pull of {} failed: {}", attempt.target.name, e));
                }
            }
            temp
        } else {
            self.git
                .run(&["checkout", &attempt.target.name], &self.workspace)?;
            if let Err(e) = self.git.run(&["pull"], &self.workspace) {
                self.log
                    .line(&format!("[warn] pull of {} failed: {}", attempt.target.name, e));
            }
            attempt.target.name.clone()
        };

        self.git
            .run(&["checkout", &attempt.feature_branch], &self.workspace)?;

        self.phase.advance(SyncPhase::Rebasing)?;
        if let Err(rebase_err) = self.git.run(&["rebase", &rebase_target], &self.workspace) {
            if rebase_state::rebase_in_progress(git_dir) {
                self.phase.advance(SyncPhase::RebasePaused)?;
                self.save_memento(attempt)?;
                self.notify.info(&format!(
                    "Rebase of {} onto {} hit conflicts. Resolve them, then run `preen resume`.",
                    attempt.feature_branch, attempt.target.name
                ));
                self.phase.advance(SyncPhase::Idle)?;
                return Ok(SyncOutcome::ConflictPaused {
                    feature_branch: attempt.feature_branch.clone(),
                    upstream: attempt.target.name.clone(),
                });
            }
            return Err(rebase_err.into());
        }

        self.phase.advance(SyncPhase::Pushing)?;
        if let Err(push_err) = self.git.run(&["push", "--force-with-lease"], &self.workspace) {
            self.phase.advance(SyncPhase::PushFailedPaused)?;
            let mut memento = self.save_memento(attempt)?;
            self.recover_paused_state(&mut memento);
            self.notify.error(&format!(
                "Push was rejected: {}. Run `preen resume` to retry.",
                push_err
            ));
            self.phase.advance(SyncPhase::Idle)?;
            return Ok(SyncOutcome::PushRejected {
                feature_branch: attempt.feature_branch.clone(),
                message: push_err.to_string(),
            });
        }

        self.phase.advance(SyncPhase::Finalizing)?;
        if attempt.target.is_remote {
            if let Some(temp) = attempt.temp_branch.take() {
                self.delete_branch_quietly(&temp);
            }
            self.reconcile_local_branch(attempt);
        }

        if attempt.has_stash {
            match self.git.run(&["stash", "pop"], &self.workspace) {
                Ok(_) => attempt.has_stash = false,
                Err(e) => {
                    self.notify.error(
                        "Your stashed changes could not be reapplied; pop them manually \
                         (see the log).",
                    );
                    self.log.line(&format!("[warn] stash pop failed: {}", e));
                    self.report_stash_by_marker(&attempt.feature_branch);
                }
            }
        }

        self.phase.advance(SyncPhase::Idle)?;
        self.notify.info(&format!(
            "Synced {} with {}.",
            attempt.feature_branch, attempt.target.name
        ));
        Ok(SyncOutcome::Completed {
            feature_branch: attempt.feature_branch.clone(),
            upstream: attempt.target.name.clone(),
        })
    }

    fn save_memento(&self, attempt: &Attempt) -> Result<SyncMemento> {
        let mut memento = SyncMemento::new(
            self.workspace.clone(),
            attempt.feature_branch.clone(),
            attempt.target.name.clone(),
        );
        memento.has_stash = attempt.has_stash;
        memento.temp_branch = attempt.temp_branch.clone();
        state::save_memento(self.store, &memento)?;
        Ok(memento)
    }

    /// Best-effort recovery right after a push rejection.
    ///
    /// Each step is independent; the memento is re-persisted as parts
    /// succeed so a later resume does not repeat them.
    fn recover_paused_state(&self, memento: &mut SyncMemento) {
        if memento.has_stash {
            match self.git.run(&["stash", "pop"], &self.workspace) {
                Ok(_) => {
                    memento.has_stash = false;
                    self.persist_quietly(memento);
                }
                Err(e) => self.log.line(&format!("[warn] stash pop failed: {}", e)),
            }
        }

        if let Some(temp) = memento.temp_branch.clone() {
            match self.git.run(&["branch", "-D", &temp], &self.workspace) {
                Ok(_) => {
                    memento.temp_branch = None;
                    self.persist_quietly(memento);
                }
                Err(e) => self.log.line(&format!(
                    "[warn] could not delete temporary branch {}: {}",
                    temp, e
                )),
            }
        }
    }

    fn persist_quietly(&self, memento: &SyncMemento) {
        if let Err(e) = state::save_memento(self.store, memento) {
            self.log
                .line(&format!("[warn] could not update sync state: {}", e));
        }
    }

    /// Make the just-synced upstream available under its local name.
    ///
    /// An existing local branch of the same name is never touched; forcing
    /// it over could discard local commits.
    fn reconcile_local_branch(&self, attempt: &Attempt) {
        let Some((_, short)) = attempt.target.name.split_once('/') else {
            return;
        };
        if short == attempt.feature_branch {
            return;
        }
        if attempt.local_names.iter().any(|n| n == short) {
            return;
        }
        if let Err(e) = self
            .git
            .run(&["branch", short, &attempt.target.name], &self.workspace)
        {
            self.log
                .line(&format!("[warn] could not create local branch {}: {}", short, e));
        }
    }

    pub(super) fn delete_branch_quietly(&self, name: &str) {
        if let Err(e) = self.git.run(&["branch", "-D", name], &self.workspace) {
            self.log.line(&format!(
                "[warn] could not delete temporary branch {}: {}",
                name, e
            ));
        }
    }

    /// When a pop fails, at least point the user at the right stash entry
    pub(super) fn report_stash_by_marker(&self, feature_branch: &str) {
        let marker = stash_marker(feature_branch);
        match self.git.run(&["stash", "list"], &self.workspace) {
            Ok(out) => {
                if let Some(line) = out.stdout.lines().find(|l| l.contains(&marker)) {
                    self.notify
                        .info(&format!("Your changes are still stashed: {}", line.trim()));
                }
            }
            Err(e) => self
                .log
                .line(&format!("[warn] could not list stashes: {}", e)),
        }
    }

    /// Best-effort restoration after an unexpected failure.
    ///
    /// Three independent attempts, each swallowing its own failure: return
    /// to the feature branch, drop the scratch branch, recover the stash.
    fn recover_after_failure(&self, attempt: &Attempt) {
        self.log
            .line("[warn] sync failed; attempting to restore the repository");

        if let Err(e) = self
            .git
            .run(&["checkout", &attempt.feature_branch], &self.workspace)
        {
            self.log.line(&format!(
                "[warn] could not return to {}: {}",
                attempt.feature_branch, e
            ));
        }

        if let Some(temp) = &attempt.temp_branch {
            self.delete_branch_quietly(temp);
        }

        if attempt.has_stash {
            if let Err(e) = self.git.run(&["stash", "pop"], &self.workspace) {
                self.log.line(&format!("[warn] stash pop failed: {}", e));
                self.report_stash_by_marker(&attempt.feature_branch);
            }
        }
    }
}

/// Stash message marking a stash as preen's, tied to the branch it was
/// taken from
pub(super) fn stash_marker(feature_branch: &str) -> String {
    format!("{} {}", STASH_MARKER, feature_branch)
}

/// Coarse human description of how long ago a memento was saved
fn rough_age(age: std::time::Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        "moments".to_string()
    } else if secs < 3600 {
        format!("{} minute(s)", secs / 60)
    } else {
        format!("{} hour(s)", secs / 3600)
    }
}

/// Scratch branch name for snapshotting a remote ref locally.
///
/// Sanitized and length-bounded so it can never exceed ref-name limits.
fn temp_branch_name(remote_ref: &str) -> String {
    let sanitized: String = remote_ref
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let mut name = format!("{}{}", TEMP_BRANCH_PREFIX, sanitized);
    name.truncate(TEMP_BRANCH_MAX_LEN);
    name
}
