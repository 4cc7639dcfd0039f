//! `git worktree` driven through the git CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};

use crate::error::{GroveError, Result};
use crate::process::{self, CommandOutput};

use super::porcelain::parse_porcelain;
use super::{Vcs, WorktreeRecord};

/// Runs git against one repository with a per-command timeout.
#[derive(Debug, Clone)]
pub struct GitWorktrees {
    /// Main repository root
    repo_root: PathBuf,
    timeout: Duration,
}

impl GitWorktrees {
    pub fn new(repo_root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            repo_root: repo_root.into(),
            timeout,
        }
    }

    /// Controller for the repository containing `dir`, rooted at its top level.
    pub async fn discover(dir: &Path, timeout: Duration) -> Result<Self> {
        let output = process::run("git", &["rev-parse", "--show-toplevel"], dir, timeout).await?;
        if !output.success {
            return Err(GroveError::Vcs(output.combined()));
        }
        let root = PathBuf::from(output.stdout.trim());
        debug!("Discovered repository root {} from {}", root.display(), dir.display());
        Ok(Self::new(root, timeout))
    }

    /// Get the repo root path.
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Check for a local branch without touching anything.
    pub async fn branch_exists(&self, branch: &str) -> Result<bool> {
        let reference = format!("refs/heads/{}", branch);
        let output = self.git(&["show-ref", "--verify", "--quiet", &reference]).await?;
        Ok(output.success)
    }

    async fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        process::run("git", args, &self.repo_root, self.timeout).await
    }

    /// Run git and turn a non-zero exit into `Vcs` with the output verbatim.
    async fn git_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.git(args).await?;
        if !output.success {
            return Err(GroveError::Vcs(output.combined()));
        }
        Ok(output)
    }
}

fn path_arg(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| GroveError::Vcs(format!("path is not valid UTF-8: {}", path.display())))
}

#[async_trait]
impl Vcs for GitWorktrees {
    async fn add(&self, dest: &Path, branch: &str, base: &str) -> Result<()> {
        let dest_arg = path_arg(dest)?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if self.branch_exists(branch).await? {
            debug!("Branch {} exists, checking it out at {}", branch, dest.display());
            self.git_checked(&["worktree", "add", dest_arg, branch]).await?;
        } else {
            debug!("Creating branch {} from {} at {}", branch, base, dest.display());
            self.git_checked(&["worktree", "add", "-b", branch, dest_arg, base])
                .await?;
        }

        info!("Added worktree {} on {}", dest.display(), branch);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<WorktreeRecord>> {
        let output = self.git_checked(&["worktree", "list", "--porcelain"]).await?;
        Ok(parse_porcelain(&output.stdout))
    }

    async fn remove(&self, path: &Path, force: bool) -> Result<()> {
        let path_str = path_arg(path)?;
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(path_str);

        self.git_checked(&args).await?;
        info!("Removed worktree {}", path.display());
        Ok(())
    }
}
