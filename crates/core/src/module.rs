//! Module enumeration and loading

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A loaded plugin module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Stable identifier, also used as the debug snapshot file stem
    pub class_name: String,
    /// Human-facing name
    pub display_name: String,
}

impl ModuleInfo {
    pub fn new(class_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            display_name: display_name.into(),
        }
    }

    /// Case-insensitive match on class name or display name
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.class_name.eq_ignore_ascii_case(query) || self.display_name.eq_ignore_ascii_case(query)
    }
}

/// The host's module registry and loader
#[async_trait]
pub trait ModuleRegistry: Send + Sync {
    /// All currently loaded modules
    fn modules(&self) -> Vec<ModuleInfo>;

    /// Look a module up by class name or display name
    fn find(&self, query: &str) -> Option<ModuleInfo> {
        self.modules().into_iter().find(|m| m.matches(query))
    }

    /// Source code the module was loaded from
    fn source(&self, class_name: &str) -> Result<Vec<u8>>;

    /// Load (or reload) a module from source text
    ///
    /// With `save == false` the reload lives only in the running process.
    async fn load_module(&self, name: &str, source: &str, save: bool) -> Result<()>;
}
