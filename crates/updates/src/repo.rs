//! Version control collaborator

use crate::Result;
use async_trait::async_trait;

/// One line of the pending log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// Abbreviated commit id
    pub id: String,
    /// Subject line
    pub message: String,
}

impl CommitSummary {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Parse a `<hash> <subject>` line
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (id, message) = match line.split_once(' ') {
            Some((id, message)) => (id, message.trim()),
            None => (line, ""),
        };
        Some(Self::new(id, message))
    }
}

/// What the update poller needs from the local checkout
#[async_trait]
pub trait Repository: Send + Sync {
    /// Full id of the local head commit
    async fn local_head(&self) -> Result<String>;

    /// Fetch from the remote(s)
    async fn fetch(&self) -> Result<()>;

    /// Full id of the tracked remote branch head
    async fn remote_head(&self) -> Result<String>;

    /// Commits reachable from the remote head but not the local head,
    /// newest first
    async fn pending_commits(&self) -> Result<Vec<CommitSummary>>;
}
