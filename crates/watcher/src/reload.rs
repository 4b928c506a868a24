//! Debug-reload watcher
//!
//! Scans the debug directory at a fixed interval and reloads any snapshot
//! whose modification time changed since the previous scan.

use crate::tracked::{DebugFiles, Observation};
use crate::WatchError;
use dk_core::ModuleRegistry;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Default scan interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// What one scan did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Seen for the first time, baseline recorded
    pub baselined: Vec<String>,
    /// Changed and reloaded
    pub reloaded: Vec<String>,
    /// Changed but the reload failed
    pub failed: Vec<String>,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.baselined.is_empty() && self.reloaded.is_empty() && self.failed.is_empty()
    }
}

/// Fixed-interval mtime watcher over the debug directory
pub struct DebugWatcher {
    /// Directory holding `<Module>.<ext>` snapshots
    dir: PathBuf,

    /// Snapshot file extension (without dot)
    extension: String,

    /// Scan interval (default: 1 second)
    interval: Duration,

    registry: Arc<dyn ModuleRegistry>,

    files: DebugFiles,
}

impl DebugWatcher {
    pub fn new(
        dir: PathBuf,
        extension: impl Into<String>,
        registry: Arc<dyn ModuleRegistry>,
        files: DebugFiles,
    ) -> Self {
        Self {
            dir,
            extension: extension.into(),
            interval: DEFAULT_INTERVAL,
            registry,
            files,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one scan
    ///
    /// A failed reload is logged and reported; a failure to enumerate the
    /// directory is returned as an error.
    pub async fn tick(&self) -> Result<TickReport, WatchError> {
        let snapshots = self.list_snapshots()?;

        let present: HashSet<String> = snapshots.iter().map(|(m, _, _)| m.clone()).collect();
        for module in self.files.retain_present(&present) {
            debug!("Debug snapshot for {} disappeared", module);
        }

        let mut report = TickReport::default();

        for (module, path, mtime) in snapshots {
            match self.files.observe(&module, &path, mtime) {
                Observation::Baseline => report.baselined.push(module),
                Observation::Unchanged => {}
                Observation::Changed => {
                    debug!("Reloading debug module {}", module);
                    match self.reload(&module, &path).await {
                        Ok(()) => report.reloaded.push(module),
                        Err(e) => {
                            error!("Failed to reload module {} in watcher: {}", module, e);
                            report.failed.push(module);
                        }
                    }
                }
            }
        }

        Ok(report)
    }

    /// Scan forever
    ///
    /// Only returns when the directory can no longer be listed. There is no
    /// restart after that.
    pub async fn run(self) -> Result<(), WatchError> {
        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Starting debug watcher on {} (interval: {:?})",
            self.dir.display(),
            self.interval
        );

        loop {
            timer.tick().await;

            match self.tick().await {
                Ok(report) => {
                    if !report.reloaded.is_empty() {
                        info!("Reloaded debug modules: {}", report.reloaded.join(", "));
                    }
                }
                Err(e) => {
                    error!("Debug watcher stopped: {}", e);
                    return Err(e);
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime
    pub fn spawn(self) -> WatcherHandle {
        WatcherHandle {
            task: tokio::spawn(self.run()),
        }
    }

    async fn reload(&self, module: &str, path: &Path) -> Result<(), WatchError> {
        let source = tokio::fs::read_to_string(path).await?;
        self.registry.load_module(module, &source, false).await?;
        Ok(())
    }

    /// `(module, path, mtime)` for every snapshot in the directory
    fn list_snapshots(&self) -> Result<Vec<(String, PathBuf, SystemTime)>, WatchError> {
        let list_err = |source| WatchError::List {
            path: self.dir.clone(),
            source,
        };

        let mut snapshots = Vec::new();

        for entry in fs::read_dir(&self.dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let path = entry.path();

            if !entry.file_type().map_err(list_err)?.is_file() {
                continue;
            }

            let Some(module) = self.module_name(&path) else {
                continue;
            };

            let mtime = entry
                .metadata()
                .and_then(|m| m.modified())
                .map_err(list_err)?;

            snapshots.push((module, path, mtime));
        }

        Ok(snapshots)
    }

    /// Module identifier from a snapshot path (file stem)
    ///
    /// Hidden files and other extensions (editor swap files) are skipped.
    fn module_name(&self, path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != self.extension {
            return None;
        }

        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() || stem.starts_with('.') {
            return None;
        }

        Some(stem.to_string())
    }
}

/// Owned handle to a spawned watcher
pub struct WatcherHandle {
    task: JoinHandle<Result<(), WatchError>>,
}

impl WatcherHandle {
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the watcher to stop. Aborting counts as a clean stop.
    pub async fn join(self) -> Result<(), WatchError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(WatchError::Task(e.to_string())),
        }
    }
}
