//! Error types for preen

use thiserror::Error;

use crate::git::GitError;

/// Result type alias for preen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for preen operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No workspace directory could be resolved
    #[error("No workspace directory found. Run preen inside a git repository or pass --workspace.")]
    NoWorkspace,

    /// The workspace is not inside a git repository
    #[error("Not a git repository: {0}")]
    NotAGitRepository(String),

    /// The git binary could not be found or spawned
    #[error("The git executable was not found. Install git or set PREEN_GIT_PATH.")]
    GitNotFound,

    /// HEAD does not point at a branch
    #[error("HEAD is detached. Check out a branch before syncing.")]
    DetachedHead,

    /// A git command exited with a non-zero status
    #[error("{0}")]
    Git(GitError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<GitError> for Error {
    /// Classify a failed git invocation into the preen error taxonomy.
    ///
    /// Callers distinguish "not a repository" and "binary not found" by
    /// substring-matching the lowercased error text; everything else is
    /// surfaced verbatim as a generic git failure.
    fn from(err: GitError) -> Self {
        if err.is_not_a_repository() {
            Error::NotAGitRepository(err.to_string())
        } else if err.is_git_missing() {
            Error::GitNotFound
        } else {
            Error::Git(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_repository_classification() {
        let err = GitError::new(
            "fatal: not a git repository (or any of the parent directories): .git",
            "",
            "fatal: not a git repository (or any of the parent directories): .git",
        );
        assert!(matches!(Error::from(err), Error::NotAGitRepository(_)));
    }

    #[test]
    fn test_git_missing_classification() {
        let err = GitError::new("git: command not found", "", "");
        assert!(matches!(Error::from(err), Error::GitNotFound));

        let err = GitError::new("failed to spawn git: ENOENT", "", "");
        assert!(matches!(Error::from(err), Error::GitNotFound));
    }

    #[test]
    fn test_generic_classification() {
        let err = GitError::new("`git rebase x` failed", "", "some other failure");
        assert!(matches!(Error::from(err), Error::Git(_)));
    }
}
