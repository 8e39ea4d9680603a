//! Shared test doubles for the workflow engines

use std::path::Path;
use std::sync::Mutex;

use crate::git::{GitCli, GitError, GitOutput};
use crate::ui::{LogSink, Notifier, PickItem, Picker};

type SideEffect = Box<dyn Fn() + Send + Sync>;

struct Rule {
    prefix: Vec<String>,
    response: Result<GitOutput, GitError>,
    effect: Option<SideEffect>,
}

/// A scripted [`GitCli`] that records every invocation.
///
/// Rules match on an argument prefix, first match wins; unmatched commands
/// succeed with empty output.
#[derive(Default)]
pub struct ScriptedGit {
    rules: Vec<Rule>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, prefix: &[&str], response: Result<GitOutput, GitError>) -> Self {
        self.rules.push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            response,
            effect: None,
        });
        self
    }

    pub fn on_with_effect(
        mut self,
        prefix: &[&str],
        response: Result<GitOutput, GitError>,
        effect: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            response,
            effect: Some(Box::new(effect)),
        });
        self
    }

    pub fn stdout(output: &str) -> Result<GitOutput, GitError> {
        Ok(GitOutput {
            stdout: output.to_string(),
            stderr: String::new(),
        })
    }

    pub fn failure(message: &str, stderr: &str) -> Result<GitOutput, GitError> {
        Err(GitError::new(message, "", stderr))
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// All recorded invocations starting with the given subcommand
    pub fn calls_for(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| c.first().map(String::as_str) == Some(subcommand))
            .collect()
    }
}

impl GitCli for ScriptedGit {
    fn run(&self, args: &[&str], _cwd: &Path) -> Result<GitOutput, GitError> {
        let call: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        self.calls.lock().unwrap().push(call.clone());

        for rule in &self.rules {
            if call.len() >= rule.prefix.len() && call[..rule.prefix.len()] == rule.prefix[..] {
                if let Some(effect) = &rule.effect {
                    effect();
                }
                return rule.response.clone();
            }
        }

        Ok(GitOutput::default())
    }
}

/// Picker returning canned answers
#[derive(Default)]
pub struct ScriptedPicker {
    pub single: Option<usize>,
    pub multi: Option<Vec<usize>>,
    /// When set, pick_many returns every pre-checked index
    pub accept_prechecked: bool,
}

impl ScriptedPicker {
    pub fn choosing(index: usize) -> Self {
        Self {
            single: Some(index),
            ..Self::default()
        }
    }

    pub fn cancelling() -> Self {
        Self::default()
    }

    pub fn keeping_prechecked() -> Self {
        Self {
            accept_prechecked: true,
            ..Self::default()
        }
    }
}

impl Picker for ScriptedPicker {
    fn pick_one(&self, _title: &str, _items: &[PickItem]) -> Option<usize> {
        self.single
    }

    fn pick_many(&self, _title: &str, items: &[PickItem]) -> Option<Vec<usize>> {
        if self.accept_prechecked {
            return Some(
                items
                    .iter()
                    .enumerate()
                    .filter(|(_, i)| i.picked)
                    .map(|(idx, _)| idx)
                    .collect(),
            );
        }
        self.multi.clone()
    }
}

/// Notifier recording every message
#[derive(Default)]
pub struct RecordingNotifier {
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Log sink recording every line
#[derive(Default)]
pub struct RecordingLog {
    pub lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for RecordingLog {
    fn line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
