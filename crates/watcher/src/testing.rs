//! Module registry double for watcher tests

use async_trait::async_trait;
use dk_core::{HostError, ModuleInfo, ModuleRegistry};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Load {
    pub name: String,
    pub source: String,
    pub save: bool,
}

#[derive(Default)]
pub struct RecordingRegistry {
    modules: Vec<ModuleInfo>,
    sources: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    loads: Mutex<Vec<Load>>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, class_name: &str, display_name: &str, source: &str) -> Self {
        self.modules.push(ModuleInfo::new(class_name, display_name));
        self.sources.insert(class_name.to_string(), source.as_bytes().to_vec());
        self
    }

    /// Make every load of `name` fail
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn loads(&self) -> Vec<Load> {
        self.loads.lock().clone()
    }
}

#[async_trait]
impl ModuleRegistry for RecordingRegistry {
    fn modules(&self) -> Vec<ModuleInfo> {
        self.modules.clone()
    }

    fn source(&self, class_name: &str) -> dk_core::Result<Vec<u8>> {
        self.sources
            .get(class_name)
            .cloned()
            .ok_or_else(|| HostError::ModuleNotFound(class_name.to_string()))
    }

    async fn load_module(&self, name: &str, source: &str, save: bool) -> dk_core::Result<()> {
        if self.failing.contains(name) {
            return Err(HostError::Load {
                name: name.to_string(),
                reason: "syntax error".to_string(),
            });
        }

        self.loads.lock().push(Load {
            name: name.to_string(),
            source: source.to_string(),
            save,
        });
        Ok(())
    }
}
