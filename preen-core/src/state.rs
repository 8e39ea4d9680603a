//! Persisted resumption state for in-flight syncs
//!
//! A paused sync leaves behind exactly one memento per workspace, stored
//! under a fixed key. The store never interprets the record; the sync
//! engine owns its lifecycle (create on pause, update as partial cleanup
//! succeeds, clear on successful resume).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Fixed storage key for the single in-flight sync record
pub const SYNC_STATE_KEY: &str = "sync-with-upstream";

/// Snapshot of an interrupted sync, enough to resume it later
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMemento {
    /// Absolute path of the workspace this sync belongs to
    pub workspace_root: PathBuf,

    /// The branch being rebased (the branch the user was on)
    pub feature_branch: String,

    /// Whether local changes were stashed and still need recovery
    pub has_stash: bool,

    /// The ref being synced against (local name or `remote/branch`)
    pub upstream_ref: String,

    /// Scratch branch snapshotting a remote ref, to delete when done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_branch: Option<String>,

    /// When the memento was saved
    #[serde(with = "humantime_serde")]
    pub saved_at: SystemTime,
}

impl SyncMemento {
    /// Create a memento for a sync that just paused
    pub fn new(
        workspace_root: impl Into<PathBuf>,
        feature_branch: impl Into<String>,
        upstream_ref: impl Into<String>,
    ) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            feature_branch: feature_branch.into(),
            has_stash: false,
            upstream_ref: upstream_ref.into(),
            temp_branch: None,
            saved_at: SystemTime::now(),
        }
    }
}

/// Opaque keyed storage for workflow state
///
/// `update(key, None)` clears the slot. Implementations persist values
/// verbatim and never inspect them.
pub trait StateStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write or clear the value stored under `key`
    fn update(&self, key: &str, value: Option<&str>) -> Result<()>;
}

/// Load the sync memento, if one is persisted
pub fn load_memento(store: &dyn StateStore) -> Result<Option<SyncMemento>> {
    match store.get(SYNC_STATE_KEY)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Persist the sync memento, replacing any previous one
pub fn save_memento(store: &dyn StateStore, memento: &SyncMemento) -> Result<()> {
    let raw = serde_json::to_string_pretty(memento)?;
    store.update(SYNC_STATE_KEY, Some(&raw))
}

/// Erase the sync memento
pub fn clear_memento(store: &dyn StateStore) -> Result<()> {
    store.update(SYNC_STATE_KEY, None)
}

/// File-backed store keeping one JSON file per key under a root directory
///
/// Rooted under the repository's git dir, this scopes state to the
/// workspace naturally.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    root: PathBuf,
}

impl FileStateStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn update(&self, key: &str, value: Option<&str>) -> Result<()> {
        let path = self.path_for(key);
        match value {
            Some(contents) => {
                std::fs::create_dir_all(&self.root)?;
                std::fs::write(&path, contents)?;
            }
            None => {
                if path.exists() {
                    std::fs::remove_file(&path)?;
                }
            }
        }
        Ok(())
    }
}

/// In-memory store, used by embedders and tests
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::Other("state store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn update(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Other("state store lock poisoned".to_string()))?;
        match value {
            Some(v) => {
                values.insert(key.to_string(), v.to_string());
            }
            None => {
                values.remove(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn sample() -> SyncMemento {
        let mut m = SyncMemento::new("/work/repo", "feature/login", "origin/main");
        m.has_stash = true;
        m.temp_branch = Some("preen/sync-origin-main".to_string());
        m
    }

    #[test]
    fn test_memento_roundtrip_file_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("state"));

        let memento = sample();
        save_memento(&store, &memento).unwrap();

        let loaded = load_memento(&store).unwrap().unwrap();
        assert_eq!(loaded, memento);

        clear_memento(&store).unwrap();
        assert!(load_memento(&store).unwrap().is_none());
    }

    #[test]
    fn test_clear_without_save_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("state"));
        clear_memento(&store).unwrap();
        assert!(load_memento(&store).unwrap().is_none());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStateStore::new();
        assert!(load_memento(&store).unwrap().is_none());

        let memento = sample();
        save_memento(&store, &memento).unwrap();
        assert_eq!(load_memento(&store).unwrap().unwrap(), memento);

        clear_memento(&store).unwrap();
        assert!(load_memento(&store).unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_previous() {
        let store = MemoryStateStore::new();
        let first = sample();
        save_memento(&store, &first).unwrap();

        let mut second = first.clone();
        second.has_stash = false;
        second.temp_branch = None;
        save_memento(&store, &second).unwrap();

        let loaded = load_memento(&store).unwrap().unwrap();
        assert!(!loaded.has_stash);
        assert!(loaded.temp_branch.is_none());
    }

    #[test]
    fn test_missing_temp_branch_field_deserializes() {
        let raw = r#"{
            "workspace_root": "/work/repo",
            "feature_branch": "dev",
            "has_stash": false,
            "upstream_ref": "main",
            "saved_at": "2026-01-01T00:00:00Z"
        }"#;
        let memento: SyncMemento = serde_json::from_str(raw).unwrap();
        assert!(memento.temp_branch.is_none());
    }

    #[test]
    fn test_file_store_scoped_by_root() {
        let dir = TempDir::new().unwrap();
        let a = FileStateStore::new(dir.path().join("a"));
        let b = FileStateStore::new(dir.path().join("b"));

        save_memento(&a, &sample()).unwrap();
        assert!(load_memento(&b).unwrap().is_none());
    }

    #[test]
    fn test_path_for_uses_key() {
        let store = FileStateStore::new(Path::new("/tmp/root"));
        assert_eq!(
            store.path_for("sync-with-upstream"),
            Path::new("/tmp/root/sync-with-upstream.json")
        );
    }
}
