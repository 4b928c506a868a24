//! Errors surfaced by host collaborators

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    /// No module matched a class name or display name
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// The loader rejected a module source
    #[error("failed to load module {name}: {reason}")]
    Load { name: String, reason: String },

    /// Sending, editing or deleting a message failed
    #[error("messaging failed: {0}")]
    Messaging(String),

    /// The key-value store could not read or write a value
    #[error("store error: {0}")]
    Store(String),

    /// Dispatch table has no handler for the command
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A command handler failed
    #[error("command {name} failed: {reason}")]
    Command { name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
