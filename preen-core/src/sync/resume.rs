//! Resuming a paused sync
//!
//! A resume reads two independent signals: the persisted memento and
//! git's own rebase-in-progress markers. They can disagree (a push
//! rejection leaves a memento with no active rebase; a user can start a
//! rebase by hand), so every combination is handled explicitly.

use crate::git::{self, rebase_state};
use crate::state;
use crate::{Error, Result};

use super::engine::SyncEngine;
use super::phase::SyncPhase;

/// Terminal result of a resume attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// No memento and no active rebase
    NothingToResume,
    /// `rebase --continue` still hit conflicts; everything left untouched
    ConflictsRemain {
        /// The branch being rebased, when git recorded it
        feature_branch: Option<String>,
    },
    /// Rebase finished (or was already done) and the push succeeded
    Completed {
        /// The branch that was synced
        feature_branch: String,
    },
}

impl SyncEngine<'_> {
    /// Resume a paused sync: continue the rebase if one is active, then
    /// push, clean up, and clear the memento.
    pub fn resume(&mut self) -> Result<ResumeOutcome> {
        let git_dir = git::resolve_git_dir(self.git, &self.workspace)?;
        let memento = state::load_memento(self.store)?;
        let rebasing = rebase_state::rebase_in_progress(&git_dir);

        if memento.is_none() && !rebasing {
            self.notify.info("Nothing to resume.");
            return Ok(ResumeOutcome::NothingToResume);
        }

        if let Some(m) = &memento {
            if rebasing && m.workspace_root != self.workspace {
                return Err(Error::Other(format!(
                    "A rebase is in progress here, but the saved sync belongs to {}. \
                     Refusing to touch either.",
                    m.workspace_root.display()
                )));
            }
        }

        self.phase.advance(SyncPhase::Resuming)?;

        if rebasing {
            self.phase.advance(SyncPhase::Rebasing)?;
            if let Err(e) = self.git.run(&["rebase", "--continue"], &self.workspace) {
                // Still-conflicted is an expected state: leave everything
                // in place for the next resume attempt.
                if e.mentions_conflict() {
                    self.notify.info(
                        "Conflicts remain. Resolve them, stage the fixes, and run \
                         `preen resume` again.",
                    );
                    return Ok(ResumeOutcome::ConflictsRemain {
                        feature_branch: rebase_state::rebasing_branch(&git_dir),
                    });
                }
                return Err(e.into());
            }
        }

        self.phase.advance(SyncPhase::Pushing)?;
        // A failed push propagates without clearing the memento, so a
        // further resume attempt stays possible.
        self.git
            .run(&["push", "--force-with-lease"], &self.workspace)?;

        self.phase.advance(SyncPhase::Finalizing)?;
        let feature_branch = match memento {
            Some(m) => {
                if let Some(temp) = &m.temp_branch {
                    self.delete_branch_quietly(temp);
                }
                if m.has_stash {
                    if let Err(e) = self.git.run(&["stash", "pop"], &self.workspace) {
                        self.notify.error(
                            "Your stashed changes could not be reapplied; pop them manually \
                             (see the log).",
                        );
                        self.log.line(&format!("[warn] stash pop failed: {}", e));
                        self.report_stash_by_marker(&m.feature_branch);
                    }
                }
                state::clear_memento(self.store)?;
                m.feature_branch
            }
            // Rebase was active with no memento (started outside preen):
            // after a successful continue HEAD is back on the branch.
            None => git::current_branch(self.git, &self.workspace)?,
        };

        self.phase.advance(SyncPhase::Idle)?;
        self.notify
            .info(&format!("Resume complete. {} is synced and pushed.", feature_branch));
        Ok(ResumeOutcome::Completed { feature_branch })
    }
}
