//! Debug-mode toggle
//!
//! Enabling debug mode writes the module's current source into the debug
//! directory as `<ClassName>.<ext>`; disabling deletes it again.

use crate::tracked::DebugFiles;
use crate::WatchError;
use dk_core::{HostError, ModuleInfo, ModuleRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Outcome of [`DebugSession::toggle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled {
    Enabled { module: ModuleInfo, path: PathBuf },
    Disabled { module: ModuleInfo },
}

pub struct DebugSession {
    dir: PathBuf,
    extension: String,
    registry: Arc<dyn ModuleRegistry>,
    files: DebugFiles,
}

impl DebugSession {
    pub fn new(
        dir: PathBuf,
        extension: impl Into<String>,
        registry: Arc<dyn ModuleRegistry>,
        files: DebugFiles,
    ) -> Self {
        Self {
            dir,
            extension: extension.into(),
            registry,
            files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot path for a module class name
    pub fn snapshot_path(&self, class_name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", class_name, self.extension))
    }

    /// Flip debug mode for the module matching `query`
    pub fn toggle(&self, query: &str) -> Result<Toggled, WatchError> {
        let module = self
            .registry
            .find(query)
            .ok_or_else(|| HostError::ModuleNotFound(query.trim().to_string()))?;

        let path = self.snapshot_path(&module.class_name);

        if path.is_file() {
            fs::remove_file(&path)?;
            self.files.deactivate(&module.class_name);
            info!("Debugging disabled for {}", module.class_name);
            return Ok(Toggled::Disabled { module });
        }

        let source = self.registry.source(&module.class_name)?;
        fs::write(&path, source)?;
        self.files.activate(&module.class_name, path.clone());

        info!("Debugging enabled for {} ({})", module.class_name, path.display());
        Ok(Toggled::Enabled { module, path })
    }

    pub fn is_debugging(&self, class_name: &str) -> bool {
        self.files.is_active(class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRegistry;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn session(dir: &Path, files: DebugFiles) -> DebugSession {
        let registry = RecordingRegistry::new()
            .with_module("TestMod", "Tester", "class TestMod: pass\n");
        DebugSession::new(dir.to_path_buf(), "py", Arc::new(registry), files)
    }

    #[test]
    fn test_toggle_writes_then_removes_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let files = DebugFiles::new();
        let session = session(temp_dir.path(), files.clone());

        let toggled = session.toggle("tester").unwrap();
        let path = temp_dir.path().join("TestMod.py");
        assert_eq!(
            toggled,
            Toggled::Enabled {
                module: ModuleInfo::new("TestMod", "Tester"),
                path: path.clone(),
            }
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "class TestMod: pass\n");
        assert!(session.is_debugging("TestMod"));

        let toggled = session.toggle("TestMod").unwrap();
        assert!(matches!(toggled, Toggled::Disabled { .. }));
        assert!(!path.exists());
        assert!(!session.is_debugging("TestMod"));
        assert!(files.is_empty());
    }

    #[test]
    fn test_toggle_unknown_module() {
        let temp_dir = TempDir::new().unwrap();
        let session = session(temp_dir.path(), DebugFiles::new());

        let err = session.toggle("Nope").unwrap_err();
        assert!(matches!(err, WatchError::Host(HostError::ModuleNotFound(ref name)) if name == "Nope"));
    }

    #[test]
    fn test_toggle_off_and_on_resets_baseline() {
        let temp_dir = TempDir::new().unwrap();
        let files = DebugFiles::new();
        let session = session(temp_dir.path(), files.clone());
        let path = session.snapshot_path("TestMod");

        session.toggle("TestMod").unwrap();
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        files.observe("TestMod", &path, t0);
        assert_eq!(files.get("TestMod").unwrap().mtime, Some(t0));

        session.toggle("TestMod").unwrap();
        session.toggle("TestMod").unwrap();

        let entry = files.get("TestMod").unwrap();
        assert_eq!(entry.mtime, None);
    }
}
