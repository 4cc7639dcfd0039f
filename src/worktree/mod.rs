//! Git worktree management
//!
//! [`Vcs`] is the seam the provisioner talks to; [`GitWorktrees`] implements
//! it by shelling out to `git`. Records are never cached: every call to
//! [`Vcs::list`] re-queries git.

mod git;
mod porcelain;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

pub use git::GitWorktrees;
pub use porcelain::parse_porcelain;

/// One worktree as reported by `git worktree list --porcelain`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorktreeRecord {
    pub path: PathBuf,
    /// Bare branch name; empty for detached or bare worktrees
    pub branch: String,
    pub head: Option<String>,
    pub bare: bool,
    pub detached: bool,
}

impl WorktreeRecord {
    /// Final path segment, used to address worktrees by name.
    pub fn name(&self) -> &str {
        self.path.file_name().and_then(|n| n.to_str()).unwrap_or("")
    }

    /// True when `name_or_branch` is this worktree's directory name or branch.
    pub fn matches(&self, name_or_branch: &str) -> bool {
        !name_or_branch.is_empty() && (self.name() == name_or_branch || self.branch == name_or_branch)
    }
}

/// Version-control operations needed to manage worktrees.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Add a worktree at `dest` on `branch`, creating the branch from `base`
    /// when it does not exist yet.
    async fn add(&self, dest: &Path, branch: &str, base: &str) -> Result<()>;

    /// All worktrees of the repository, including the main one.
    async fn list(&self) -> Result<Vec<WorktreeRecord>>;

    /// Remove the worktree at `path`. Without `force`, a dirty worktree is refused.
    async fn remove(&self, path: &Path, force: bool) -> Result<()>;
}
