//! Directory-backed module registry
//!
//! Every `<ClassName>.<ext>` file in the modules directory is a module. A
//! `# name: Display Name` line near the top sets the display name.

use async_trait::async_trait;
use dk_core::{HostError, ModuleInfo, ModuleRegistry};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lines searched for the display-name header
const HEADER_LINES: usize = 10;

pub struct FsModuleRegistry {
    dir: PathBuf,
    extension: String,
    /// Sources loaded without saving, by class name
    overlay: Mutex<BTreeMap<String, String>>,
}

impl FsModuleRegistry {
    pub fn open(dir: &Path, extension: impl Into<String>) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            extension: extension.into(),
            overlay: Mutex::new(BTreeMap::new()),
        })
    }

    fn module_path(&self, class_name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", class_name, self.extension))
    }

    fn on_disk(&self) -> Vec<(String, PathBuf)> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut found: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str()))
            .filter_map(|p| {
                let stem = p.file_stem()?.to_str()?.to_string();
                Some((stem, p))
            })
            .collect();
        found.sort();
        found
    }
}

/// Display name from a `# name: ...` header, if any
pub fn display_name(source: &str) -> Option<String> {
    source
        .lines()
        .take(HEADER_LINES)
        .filter_map(|l| l.trim().strip_prefix('#'))
        .filter_map(|l| l.trim().strip_prefix("name:"))
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}

#[async_trait]
impl ModuleRegistry for FsModuleRegistry {
    fn modules(&self) -> Vec<ModuleInfo> {
        let overlay = self.overlay.lock();
        let mut modules = BTreeMap::new();

        for (class_name, path) in self.on_disk() {
            let source = match overlay.get(&class_name) {
                Some(source) => source.clone(),
                None => fs::read_to_string(&path).unwrap_or_default(),
            };
            let display = display_name(&source).unwrap_or_else(|| class_name.clone());
            modules.insert(class_name.clone(), ModuleInfo::new(class_name, display));
        }

        for (class_name, source) in overlay.iter() {
            modules.entry(class_name.clone()).or_insert_with(|| {
                let display = display_name(source).unwrap_or_else(|| class_name.clone());
                ModuleInfo::new(class_name.clone(), display)
            });
        }

        modules.into_values().collect()
    }

    fn source(&self, class_name: &str) -> dk_core::Result<Vec<u8>> {
        if let Some(source) = self.overlay.lock().get(class_name) {
            return Ok(source.clone().into_bytes());
        }

        let path = self.module_path(class_name);
        if !path.is_file() {
            return Err(HostError::ModuleNotFound(class_name.to_string()));
        }
        Ok(fs::read(path)?)
    }

    async fn load_module(&self, name: &str, source: &str, save: bool) -> dk_core::Result<()> {
        if source.trim().is_empty() {
            return Err(HostError::Load {
                name: name.to_string(),
                reason: "empty source".to_string(),
            });
        }

        if save {
            tokio::fs::write(self.module_path(name), source).await?;
            self.overlay.lock().remove(name);
            debug!("Saved module {} to {}", name, self.dir.display());
        } else {
            self.overlay.lock().insert(name.to_string(), source.to_string());
        }

        info!("Loaded module {} ({} bytes, persisted: {})", name, source.len(), save);
        Ok(())
    }
}
