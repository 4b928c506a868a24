//! Common utilities for integration tests

pub mod cli;

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp directory with a config pointing every path inside it
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("modules")).expect("modules dir");

        let config = format!(
            r#"[host]
modules_dir = "{root}/modules"
store_path = "{root}/db"
outbox_dir = "{root}/outbox"
prefix = "."
owner_chat = 1

[watcher]
debug_dir = "{root}/debug_modules"
interval_ms = 100

[updates]
enabled = false
"#,
            root = root.display()
        );
        fs::write(root.join("config.toml"), config).expect("config");

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> PathBuf {
        self.root().join("config.toml")
    }

    pub fn add_module(&self, class_name: &str, source: &str) {
        fs::write(self.root().join("modules").join(format!("{}.py", class_name)), source)
            .expect("module source");
    }
}
