//! Preen Core - branch maintenance workflows for git repositories
//!
//! This crate provides the engines behind preen: a resumable
//! sync-with-upstream workflow, a stale-branch sweep, and a post-merge
//! branch-switch workflow, all driving the `git` binary through a small
//! subprocess runner.

pub mod config;
pub mod error;
pub mod git;
pub mod postmerge;
pub mod state;
pub mod sweep;
pub mod sync;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{Error, Result};
pub use git::{BranchRecord, GitCli, GitError, GitOutput, GitRunner};
pub use postmerge::{PostMergeOutcome, PostMergeWorkflow};
pub use state::{FileStateStore, MemoryStateStore, StateStore, SyncMemento, SYNC_STATE_KEY};
pub use sweep::{SweepEngine, SweepMode, SweepOutcome};
pub use sync::{ResumeOutcome, SyncEngine, SyncOutcome};
pub use ui::{LogSink, Notifier, PickItem, Picker};
