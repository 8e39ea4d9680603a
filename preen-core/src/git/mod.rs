//! Git subprocess execution and output parsing
//!
//! This module provides the command runner every workflow drives git
//! through, plus pure parsers for `git branch` output and probes for git's
//! on-disk rebase state.

mod parse;
pub mod rebase_state;
mod runner;

use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub use parse::{parse_branches, parse_gone_branches, BranchRecord};
pub use runner::{GitCli, GitError, GitOutput, GitRunner};

/// Resolve the git directory for a workspace.
///
/// Fails with [`Error::NotAGitRepository`] when the workspace is not inside
/// a repository. A relative answer from git is joined onto the workspace.
pub fn resolve_git_dir(git: &dyn GitCli, workspace: &Path) -> Result<PathBuf> {
    let out = git
        .run(&["rev-parse", "--git-dir"], workspace)
        .map_err(|e| {
            if e.is_git_missing() {
                Error::GitNotFound
            } else {
                Error::NotAGitRepository(workspace.display().to_string())
            }
        })?;

    let dir = PathBuf::from(out.stdout.trim());
    if dir.is_absolute() {
        Ok(dir)
    } else {
        Ok(workspace.join(dir))
    }
}

/// Determine the currently checked out branch.
///
/// Fails with [`Error::DetachedHead`] when HEAD does not name a branch.
pub fn current_branch(git: &dyn GitCli, workspace: &Path) -> Result<String> {
    let out = git.run(&["rev-parse", "--abbrev-ref", "HEAD"], workspace)?;
    let name = out.stdout.trim().to_string();
    if name.is_empty() || name == "HEAD" {
        return Err(Error::DetachedHead);
    }
    Ok(name)
}
