//! Subprocess execution of git commands

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use thiserror::Error;

use crate::ui::LogSink;

/// Captured output of a completed git command
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// A failed git invocation
///
/// Carries any partial output the process produced so callers can inspect
/// it and the log can show it.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GitError {
    /// Human-readable failure description
    pub message: String,
    /// Partial standard output, if any
    pub stdout: String,
    /// Partial standard error, if any
    pub stderr: String,
}

impl GitError {
    /// Create a git error from message and captured output
    pub fn new(
        message: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// All failure text, lowercased, for substring classification
    fn haystack(&self) -> String {
        format!("{} {}", self.message, self.stderr).to_lowercase()
    }

    /// Whether this failure means the directory is not a git repository
    pub fn is_not_a_repository(&self) -> bool {
        self.haystack().contains("not a git repository")
    }

    /// Whether this failure means the git binary itself is missing
    pub fn is_git_missing(&self) -> bool {
        let text = self.haystack();
        text.contains("command not found") || text.contains("enoent")
    }

    /// Whether the failure text indicates unresolved rebase conflicts
    pub fn mentions_conflict(&self) -> bool {
        let text = format!("{} {}", self.haystack(), self.stdout.to_lowercase());
        text.contains("conflict") || text.contains("could not apply")
    }
}

/// Executes a single git subcommand against a working directory
///
/// Implementations must invoke the binary with an argument vector, never a
/// shell string, so branch names containing metacharacters cannot inject
/// commands.
pub trait GitCli: Send + Sync {
    /// Run git with the given arguments in `cwd`
    fn run(&self, args: &[&str], cwd: &Path) -> Result<GitOutput, GitError>;
}

/// The real command runner, spawning the configured git executable
pub struct GitRunner {
    git_path: String,
    log: Arc<dyn LogSink>,
}

impl std::fmt::Debug for GitRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRunner")
            .field("git_path", &self.git_path)
            .finish_non_exhaustive()
    }
}

impl GitRunner {
    /// Create a runner for the given git executable, logging every
    /// invocation to `log`
    pub fn new(git_path: impl Into<String>, log: Arc<dyn LogSink>) -> Self {
        Self {
            git_path: git_path.into(),
            log,
        }
    }

    /// Render a command line for display only; never handed to a shell
    fn render(&self, args: &[&str]) -> String {
        let mut line = String::from("$ ");
        line.push_str(&self.git_path);
        for arg in args {
            line.push(' ');
            if arg.contains(' ') {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }

    fn log_output(&self, stdout: &str, stderr: &str) {
        for text in [stdout, stderr] {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                for line in trimmed.lines() {
                    self.log.line(line);
                }
            }
        }
    }
}

impl GitCli for GitRunner {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<GitOutput, GitError> {
        let rendered = self.render(args);
        self.log.line(&rendered);

        let output = Command::new(&self.git_path)
            .args(args)
            .current_dir(cwd)
            .output();

        let output = match output {
            Ok(out) => out,
            Err(e) => {
                let message = if e.kind() == std::io::ErrorKind::NotFound {
                    format!("{}: command not found", self.git_path)
                } else {
                    format!("failed to spawn {}: {}", self.git_path, e)
                };
                self.log.line(&format!("[error] {}", message));
                return Err(GitError::new(message, "", ""));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        self.log_output(&stdout, &stderr);

        if output.status.success() {
            Ok(GitOutput { stdout, stderr })
        } else {
            let message = format!(
                "`{}` failed ({}): {}",
                rendered.trim_start_matches("$ "),
                output.status,
                stderr.trim()
            );
            self.log.line(&format!("[error] {}", message));
            Err(GitError::new(message, stdout, stderr))
        }
    }
}
