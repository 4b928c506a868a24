//! Debug-mode hot reloading for plugin modules
//!
//! This crate provides:
//! - Debug directory preparation (created and emptied at startup)
//! - A tracked-file table shared between the toggle and the watcher
//! - The debug-mode toggle that snapshots a module's source into the directory
//! - A fixed-interval mtime watcher that reloads changed snapshots

pub mod dir;
pub mod reload;
pub mod session;
pub mod tracked;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use thiserror::Error;

// Re-exports
pub use dir::prepare_debug_dir;
pub use reload::{DebugWatcher, TickReport, WatcherHandle};
pub use session::{DebugSession, Toggled};
pub use tracked::{DebugFiles, DebugState, Observation, TrackedDebugFile};

/// Default snapshot file extension
pub const DEFAULT_EXTENSION: &str = "py";

#[derive(Debug, Error)]
pub enum WatchError {
    /// The debug directory could not be enumerated
    #[error("failed to list {}: {source}", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Host(#[from] dk_core::HostError),

    /// The watcher task panicked
    #[error("watcher task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
