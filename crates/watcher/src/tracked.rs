//! Tracked debug snapshots
//!
//! One entry per module identifier. The toggle inserts and drops entries;
//! the watcher records observed modification times.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// How a snapshot came to be tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugState {
    /// Debug mode was enabled through the toggle
    Active,
    /// The file showed up in the directory without going through the toggle
    Untracked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedDebugFile {
    pub module: String,
    pub path: PathBuf,
    /// Last observed modification time; `None` until the first observation
    pub mtime: Option<SystemTime>,
    pub state: DebugState,
}

/// Result of recording one modification time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First sighting, timestamp recorded as baseline
    Baseline,
    Unchanged,
    /// Timestamp differs from the recorded one (and has been updated)
    Changed,
}

/// Shared table of tracked snapshots
#[derive(Debug, Clone, Default)]
pub struct DebugFiles {
    inner: Arc<Mutex<HashMap<String, TrackedDebugFile>>>,
}

impl DebugFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a module whose snapshot was just written
    ///
    /// Any previous entry is replaced, so the next observation is a baseline.
    pub fn activate(&self, module: &str, path: PathBuf) {
        self.inner.lock().insert(
            module.to_string(),
            TrackedDebugFile {
                module: module.to_string(),
                path,
                mtime: None,
                state: DebugState::Active,
            },
        );
    }

    /// Stop tracking a module
    pub fn deactivate(&self, module: &str) -> Option<TrackedDebugFile> {
        self.inner.lock().remove(module)
    }

    /// Whether debug mode was enabled for this module through the toggle
    pub fn is_active(&self, module: &str) -> bool {
        self.inner
            .lock()
            .get(module)
            .map_or(false, |f| f.state == DebugState::Active)
    }

    pub fn get(&self, module: &str) -> Option<TrackedDebugFile> {
        self.inner.lock().get(module).cloned()
    }

    /// Record the modification time seen for a module's snapshot
    pub fn observe(&self, module: &str, path: &Path, mtime: SystemTime) -> Observation {
        let mut files = self.inner.lock();

        let entry = files
            .entry(module.to_string())
            .or_insert_with(|| TrackedDebugFile {
                module: module.to_string(),
                path: path.to_path_buf(),
                mtime: None,
                state: DebugState::Untracked,
            });

        match entry.mtime {
            None => {
                entry.mtime = Some(mtime);
                Observation::Baseline
            }
            Some(seen) if seen == mtime => Observation::Unchanged,
            Some(_) => {
                entry.mtime = Some(mtime);
                Observation::Changed
            }
        }
    }

    /// Drop observed entries whose files are gone
    ///
    /// Entries that have never been observed are kept: their snapshot may
    /// have been written after the directory listing was taken.
    pub fn retain_present(&self, present: &HashSet<String>) -> Vec<String> {
        let mut files = self.inner.lock();
        let gone: Vec<String> = files
            .values()
            .filter(|f| f.mtime.is_some() && !present.contains(&f.module))
            .map(|f| f.module.clone())
            .collect();

        for module in &gone {
            files.remove(module);
        }
        gone
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Module identifiers currently tracked, sorted
    pub fn modules(&self) -> Vec<String> {
        let mut modules: Vec<_> = self.inner.lock().keys().cloned().collect();
        modules.sort();
        modules
    }
}
