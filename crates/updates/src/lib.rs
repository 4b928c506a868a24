//! Update notifications for a git-tracked installation
//!
//! This crate provides:
//! - A `Repository` abstraction over local/remote heads and the pending log
//! - `GitRepo`, driving the `git` binary
//! - Changelog rendering for notification messages
//! - Persisted notification state (notified / suppressed / last message)
//! - `UpdateNotifier`: the polling loop and its inline action handling

pub mod changelog;
pub mod git;
pub mod notifier;
pub mod repo;
pub mod state;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use thiserror::Error;

// Re-exports
pub use changelog::{render_changelog, CHANGELOG_LIMIT};
pub use git::GitRepo;
pub use notifier::{ActionOutcome, NotifierConfig, TickOutcome, UpdateNotifier, ACTION_IGNORE, ACTION_UPDATE};
pub use repo::{CommitSummary, Repository};
pub use state::UpdateState;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// git ran but exited unsuccessfully
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    /// git could not be started
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    /// git printed something we could not interpret
    #[error("unexpected git output: {0}")]
    Parse(String),

    #[error(transparent)]
    Host(#[from] dk_core::HostError),
}

pub type Result<T> = std::result::Result<T, UpdateError>;
