//! Git operations through the `git` binary

use crate::repo::{CommitSummary, Repository};
use crate::{Result, UpdateError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A local checkout tracking one remote branch
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
    remote: String,
    branch: String,
}

impl GitRepo {
    /// Open the checkout containing `root`
    ///
    /// Fails with [`UpdateError::NotARepository`] when `root` is not inside a
    /// git work tree.
    pub async fn open(root: &Path) -> Result<Self> {
        let repo = Self {
            root: root.to_path_buf(),
            remote: "origin".to_string(),
            branch: "master".to_string(),
        };

        match repo.git(&["rev-parse", "--is-inside-work-tree"]).await {
            Ok(out) if out.trim() == "true" => Ok(repo),
            Ok(_) | Err(UpdateError::Git { .. }) => Err(UpdateError::NotARepository(root.to_path_buf())),
            Err(e) => Err(e),
        }
    }

    /// Track a different remote branch (default: `origin/master`)
    pub fn with_remote(mut self, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        self.remote = remote.into();
        self.branch = branch.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<remote>/<branch>`
    pub fn remote_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }

    /// Fast-forward the checkout to the tracked remote branch
    pub async fn pull(&self) -> Result<String> {
        let out = self
            .git(&["pull", "--ff-only", &self.remote, &self.branch])
            .await?;
        Ok(out.trim().to_string())
    }

    /// Run git in the checkout and return stdout
    async fn git(&self, args: &[&str]) -> Result<String> {
        debug!("git {}", args.join(" "));

        let output = Command::new("git")
            .current_dir(&self.root)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(UpdateError::Spawn)?;

        if !output.status.success() {
            return Err(UpdateError::Git {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn rev_parse(&self, rev: &str) -> Result<String> {
        let out = self.git(&["rev-parse", "--verify", "--quiet", rev]).await?;
        let id = out.trim();

        if id.len() < 40 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(UpdateError::Parse(format!("rev-parse {}: {:?}", rev, id)));
        }
        Ok(id.to_string())
    }
}

#[async_trait]
impl Repository for GitRepo {
    async fn local_head(&self) -> Result<String> {
        self.rev_parse("HEAD").await
    }

    async fn fetch(&self) -> Result<()> {
        self.git(&["fetch", "--all", "--quiet"]).await?;
        Ok(())
    }

    async fn remote_head(&self) -> Result<String> {
        self.rev_parse(&self.remote_ref()).await
    }

    async fn pending_commits(&self) -> Result<Vec<CommitSummary>> {
        let range = format!("HEAD..{}", self.remote_ref());
        let out = self
            .git(&["log", "--no-decorate", "--format=%h %s", &range])
            .await?;

        Ok(out.lines().filter_map(CommitSummary::parse_line).collect())
    }
}
