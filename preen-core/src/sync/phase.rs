//! Phases of the sync-with-upstream workflow
//!
//! The engine advances through these phases in a fixed order; the pause
//! phases exit the workflow with a persisted memento instead of an error.
//! Transitions are validated so a refactor cannot silently skip a
//! checkpoint, and every transition is logged.

use crate::{Error, Result};

/// Phase of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No sync in flight
    Idle,
    /// `git fetch -p`
    Fetching,
    /// Branch listing and target selection
    SelectingTarget,
    /// Stashing local modifications
    Stashing,
    /// Checking out and refreshing the rebase target
    PreparingTarget,
    /// Rebasing the feature branch onto the target
    Rebasing,
    /// Force-with-lease push of the rebased branch
    Pushing,
    /// Temp-branch cleanup, local-branch reconciliation, stash recovery
    Finalizing,
    /// Exited on a rebase conflict with a memento persisted
    RebasePaused,
    /// Exited on a push rejection with a memento persisted
    PushFailedPaused,
    /// Re-entering a paused sync
    Resuming,
}

impl SyncPhase {
    /// Whether `self` is a legal successor of `prev`
    pub fn can_follow(self, prev: SyncPhase) -> bool {
        use SyncPhase::*;
        matches!(
            (prev, self),
            (Idle, Fetching)
                | (Idle, Resuming)
                | (Fetching, SelectingTarget)
                | (SelectingTarget, Idle)
                | (SelectingTarget, Stashing)
                | (SelectingTarget, PreparingTarget)
                | (Stashing, PreparingTarget)
                | (PreparingTarget, Rebasing)
                | (Rebasing, Pushing)
                | (Rebasing, RebasePaused)
                | (Pushing, Finalizing)
                | (Pushing, PushFailedPaused)
                | (Finalizing, Idle)
                | (RebasePaused, Idle)
                | (PushFailedPaused, Idle)
                | (Resuming, Rebasing)
                | (Resuming, Pushing)
                | (Resuming, Idle)
        )
    }
}

/// Tracks the current phase and rejects out-of-order transitions
#[derive(Debug)]
pub struct PhaseTracker {
    current: SyncPhase,
}

impl PhaseTracker {
    /// Start a tracker in the idle phase
    pub fn new() -> Self {
        Self {
            current: SyncPhase::Idle,
        }
    }

    /// The current phase
    pub fn current(&self) -> SyncPhase {
        self.current
    }

    /// Advance to the next phase, logging the transition
    pub fn advance(&mut self, next: SyncPhase) -> Result<()> {
        if !next.can_follow(self.current) {
            return Err(Error::Other(format!(
                "invalid sync phase transition from {:?} to {:?}",
                self.current, next
            )));
        }

        tracing::debug!(from = ?self.current, to = ?next, "sync phase transition");
        self.current = next;
        Ok(())
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
