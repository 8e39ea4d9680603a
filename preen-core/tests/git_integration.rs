//! Integration tests for the command runner against a real git binary
//!
//! Each test builds a throwaway repository; all of them bail out quietly
//! when git is not installed.

use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};

use preen_core::git::{self, GitCli, GitRunner};
use preen_core::{Error, LogSink};
use tempfile::TempDir;

#[derive(Default)]
struct MemoryLog(Mutex<Vec<String>>);

impl LogSink for MemoryLog {
    fn line(&self, line: &str) {
        self.0.lock().unwrap().push(line.to_string());
    }
}

fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(status.status.success(), "git {:?} failed", args);
}

fn init_repo(dir: &Path) {
    git(dir, &["init"]);
    // normalize the unborn branch name regardless of init.defaultBranch
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    std::fs::write(dir.join("README.md"), "hello\n").unwrap();
    git(dir, &["add", "."]);
    git(
        dir,
        &[
            "-c",
            "user.name=preen",
            "-c",
            "user.email=preen@example.com",
            "commit",
            "-m",
            "init",
        ],
    );
}

#[test]
fn test_runner_logs_every_invocation() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_repo(dir.path());

    let log = Arc::new(MemoryLog::default());
    let runner = GitRunner::new("git", log.clone());

    let out = runner.run(&["status", "--porcelain"], dir.path()).unwrap();
    assert!(out.stdout.trim().is_empty());

    let lines = log.0.lock().unwrap();
    assert!(lines[0].starts_with("$ git status"));
}

#[test]
fn test_current_branch_in_fresh_repo() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_repo(dir.path());

    let log = Arc::new(MemoryLog::default());
    let runner = GitRunner::new("git", log);

    let branch = git::current_branch(&runner, dir.path()).unwrap();
    assert_eq!(branch, "main");
}

#[test]
fn test_detached_head_is_classified() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    git(dir.path(), &["checkout", "--detach"]);

    let log = Arc::new(MemoryLog::default());
    let runner = GitRunner::new("git", log);

    let result = git::current_branch(&runner, dir.path());
    assert!(matches!(result, Err(Error::DetachedHead)));
}

#[test]
fn test_non_repo_is_classified() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();

    let log = Arc::new(MemoryLog::default());
    let runner = GitRunner::new("git", log);

    let result = git::resolve_git_dir(&runner, dir.path());
    assert!(matches!(result, Err(Error::NotAGitRepository(_))));
}

#[test]
fn test_resolve_git_dir_is_absolute() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_repo(dir.path());

    let log = Arc::new(MemoryLog::default());
    let runner = GitRunner::new("git", log);

    let git_dir = git::resolve_git_dir(&runner, dir.path()).unwrap();
    assert!(git_dir.is_absolute());
    assert!(git_dir.exists());
}

#[test]
fn test_failed_command_carries_stderr() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    init_repo(dir.path());

    let log = Arc::new(MemoryLog::default());
    let runner = GitRunner::new("git", log.clone());

    let err = runner
        .run(&["checkout", "no-such-branch"], dir.path())
        .unwrap_err();
    assert!(!err.stderr.is_empty());

    // the failure was logged before the caller saw it
    let lines = log.0.lock().unwrap();
    assert!(lines.iter().any(|l| l.starts_with("[error]")));
}
