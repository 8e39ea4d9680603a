//! Collaborator interfaces for user interaction
//!
//! The engines never talk to a terminal or editor directly. Selection,
//! notification, and log output go through these traits so that front ends
//! (and tests) can supply their own implementations.

/// A single entry offered for selection
#[derive(Debug, Clone)]
pub struct PickItem {
    /// Primary label shown to the user
    pub label: String,
    /// Optional secondary detail (e.g. "remote branch")
    pub detail: Option<String>,
    /// Whether the item starts out selected
    pub picked: bool,
}

impl PickItem {
    /// Create an unpicked item with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
            picked: false,
        }
    }

    /// Attach a detail line
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Mark the item as pre-selected
    pub fn picked(mut self, picked: bool) -> Self {
        self.picked = picked;
        self
    }
}

/// Interactive selection from a labelled list
///
/// Cancellation is expressed as `None` and is always a clean no-op for the
/// calling workflow, never an error.
pub trait Picker: Send + Sync {
    /// Pick a single item; returns its index, or `None` on cancellation
    fn pick_one(&self, title: &str, items: &[PickItem]) -> Option<usize>;

    /// Pick any number of items; returns their indices, or `None` on
    /// cancellation. Items with `picked` set start out selected.
    fn pick_many(&self, title: &str, items: &[PickItem]) -> Option<Vec<usize>>;
}

/// Terminal info/error messages shown to the user
pub trait Notifier: Send + Sync {
    /// Show an informational message
    fn info(&self, message: &str);

    /// Show an error message
    fn error(&self, message: &str);
}

/// Append-only line sink for diagnostic output
///
/// Every git invocation and every best-effort recovery failure lands here;
/// user-facing notifications stay short and point at this log for detail.
pub trait LogSink: Send + Sync {
    /// Append one line to the log
    fn line(&self, line: &str);
}
