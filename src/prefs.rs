//! Persisted UI preferences: the last active workspace and the last board
//! used in each workspace.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiPrefs {
    #[serde(default)]
    pub last_workspace_id: Option<String>,
    #[serde(default)]
    pub last_board_by_workspace: BTreeMap<String, String>,
}

impl UiPrefs {
    /// Remember the active pair.
    pub fn remember(&mut self, workspace_id: &str, board_id: &str) {
        self.last_workspace_id = Some(workspace_id.to_string());
        self.last_board_by_workspace
            .insert(workspace_id.to_string(), board_id.to_string());
    }

    /// Fill in boards for workspaces that have no remembered board yet.
    pub fn merge_defaults(&mut self, defaults: BTreeMap<String, String>) {
        for (ws, board) in defaults {
            self.last_board_by_workspace.entry(ws).or_insert(board);
        }
    }
}

/// Reads and writes `UiPrefs` as JSON.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/kanji/state.json`, or `./state.json` when there is no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("kanji"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("state.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences; a missing or unreadable file yields defaults.
    pub fn load(&self) -> UiPrefs {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return UiPrefs::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable ui state");
                UiPrefs::default()
            }
        }
    }

    /// Write preferences with temp file + rename.
    pub fn save(&self, prefs: &UiPrefs) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(prefs)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load(), UiPrefs::default());
    }

    #[test]
    fn test_save_and_load_roundtrip_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::new(dir.path().join("nested/kanji/state.json"));
        let mut prefs = UiPrefs::default();
        prefs.remember("w1", "b1");
        store.save(&prefs).unwrap();
        assert_eq!(store.load(), prefs);
        assert!(fs::read_to_string(store.path()).unwrap().contains("last_board_by_workspace"));
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(PrefsStore::new(path).load(), UiPrefs::default());
    }

    #[test]
    fn test_merge_defaults_keeps_existing() {
        let mut prefs = UiPrefs::default();
        prefs.remember("w1", "b1");
        let mut defaults = BTreeMap::new();
        defaults.insert("w1".to_string(), "b9".to_string());
        defaults.insert("w2".to_string(), "b2".to_string());
        prefs.merge_defaults(defaults);
        assert_eq!(prefs.last_board_by_workspace["w1"], "b1");
        assert_eq!(prefs.last_board_by_workspace["w2"], "b2");
    }
}
