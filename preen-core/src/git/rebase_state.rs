//! Probes for git's on-disk rebase state
//!
//! While a rebase is paused git keeps a `rebase-merge` or `rebase-apply`
//! directory under the git dir, containing a `head-name` file naming the
//! branch being rebased. These probes only check existence and read UTF-8
//! text; they never modify anything.

use std::path::Path;

const REBASE_DIRS: [&str; 2] = ["rebase-merge", "rebase-apply"];

/// Whether a rebase is currently in progress for this git dir
pub fn rebase_in_progress(git_dir: &Path) -> bool {
    REBASE_DIRS.iter().any(|d| git_dir.join(d).exists())
}

/// The branch being rebased, if git recorded one
pub fn rebasing_branch(git_dir: &Path) -> Option<String> {
    for dir in REBASE_DIRS {
        let head_name = git_dir.join(dir).join("head-name");
        if let Ok(contents) = std::fs::read_to_string(&head_name) {
            let name = contents.trim();
            let name = name.strip_prefix("refs/heads/").unwrap_or(name);
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}
