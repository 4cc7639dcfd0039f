//! EnvironmentProvisioner sequences worktree, template, docker and proxy setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::Config;
use crate::container::{ContainerRuntime, DockerCli};
use crate::error::{GroveError, ProvisionStep, Result};
use crate::naming::{sanitize, worktree_path};
use crate::proxy::route_for;
use crate::template::{ContextBuilder, TemplateRenderer};
use crate::worktree::{GitWorktrees, Vcs, WorktreeRecord};

use super::report::ProvisionReport;

/// Manages per-branch environments for one repository.
pub struct EnvironmentProvisioner {
    config: Arc<Config>,
    repo_root: PathBuf,
    vcs: Arc<dyn Vcs>,
    containers: Arc<dyn ContainerRuntime>,
    renderer: TemplateRenderer,
}

impl EnvironmentProvisioner {
    /// Provisioner backed by the `git` and `docker` CLIs.
    ///
    /// A relative `repo_root` is resolved against the current directory.
    pub fn new(config: Config, repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = absolute_root(repo_root.into());
        let timeout = Duration::from_millis(config.commands.timeout_ms);
        let vcs = Arc::new(GitWorktrees::new(repo_root.clone(), timeout));
        let containers = Arc::new(DockerCli::new(timeout));
        Self::with_backends(config, repo_root, vcs, containers)
    }

    /// Provisioner with explicit version-control and container backends.
    pub fn with_backends(
        config: Config,
        repo_root: impl Into<PathBuf>,
        vcs: Arc<dyn Vcs>,
        containers: Arc<dyn ContainerRuntime>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repo_root: absolute_root(repo_root.into()),
            vcs,
            containers,
            renderer: TemplateRenderer::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Create the worktree for `branch` and everything that hangs off it.
    ///
    /// `template_set` may be empty to use the configured default. On failure
    /// the error is `Provision` naming the failing step; earlier steps stay applied.
    pub async fn create_worktree(&self, branch: &str, base: &str, template_set: &str) -> Result<ProvisionReport> {
        let config = &self.config;
        let sanitized = sanitize(branch);
        let dest = worktree_path(config, &self.repo_root, branch);
        let mut report = ProvisionReport::new(branch, sanitized, dest);
        info!("Creating worktree for {} at {}", branch, report.worktree_path.display());

        self.vcs
            .add(&report.worktree_path, branch, base)
            .await
            .map_err(|e| report.fail(ProvisionStep::VcsCreate, e))?;
        report.commit(ProvisionStep::VcsCreate);

        let rendered = self
            .render_templates(&report.worktree_path, branch, template_set)
            .map_err(|e| report.fail(ProvisionStep::TemplateRender, e))?;
        if let Some((set_name, files)) = rendered {
            report.template_set = Some(set_name);
            report.rendered = files;
            report.commit(ProvisionStep::TemplateRender);
        }

        if config.docker.enabled {
            let network = config.docker.resolved_network_name(&config.project);
            self.containers
                .ensure_network(&network)
                .await
                .map_err(|e| report.fail(ProvisionStep::ContainerSetup, e))?;
            let compose_file = report.worktree_path.join(&config.docker.compose_file);
            if compose_file.exists() {
                report.compose_file = Some(compose_file);
            }
            report.network = Some(network);
            report.commit(ProvisionStep::ContainerSetup);
        }

        if config.web.enabled {
            let route = route_for(&config.web, &config.project, &report.sanitized);
            info!("Web URL for {}: {}", branch, route.url);
            report.route = Some(route);
            report.commit(ProvisionStep::ProxySetup);
        }

        info!("Worktree for {} ready ({} steps)", branch, report.completed.len());
        Ok(report)
    }

    /// Render the selected template set into the worktree.
    ///
    /// `Ok(None)` when no template sets are configured.
    fn render_templates(
        &self,
        worktree: &Path,
        branch: &str,
        template_set: &str,
    ) -> Result<Option<(String, Vec<PathBuf>)>> {
        let Some((set_name, set)) = self.config.templates.resolve(template_set)? else {
            debug!("No template sets configured, skipping templates");
            return Ok(None);
        };

        let context = ContextBuilder::new(&self.config).build(worktree, branch);
        let templates_dir = Config::templates_dir(&self.repo_root);
        let mut rendered = Vec::with_capacity(set.files.len());

        for file in &set.files {
            let source = templates_dir.join(&file.src);
            let dest = worktree.join(&file.dest);
            self.renderer.render(&source, &dest, &context)?;
            rendered.push(dest);
        }

        info!("Rendered {} file(s) from template set {}", rendered.len(), set_name);
        Ok(Some((set_name.to_string(), rendered)))
    }

    /// Every worktree of the repository, freshly queried.
    pub async fn list_worktrees(&self) -> Result<Vec<WorktreeRecord>> {
        self.vcs.list().await
    }

    /// Path of the single worktree whose directory name or branch is `name_or_branch`.
    pub async fn worktree_path(&self, name_or_branch: &str) -> Result<PathBuf> {
        let worktrees = self.vcs.list().await?;
        resolve_target(&worktrees, name_or_branch).map(|wt| wt.path.clone())
    }

    /// Remove a worktree by directory name or branch.
    ///
    /// The main working tree and bare entries are never candidates. Compose
    /// services are stopped first when a compose file is present; failures
    /// there are logged and ignored. Returns the removed path.
    pub async fn remove_worktree(&self, name_or_branch: &str, force: bool) -> Result<PathBuf> {
        let wrap = |source: GroveError| GroveError::Removal {
            target: name_or_branch.to_string(),
            source: Box::new(source),
        };

        let worktrees = self.vcs.list().await.map_err(wrap)?;
        let removable = removable_worktrees(&worktrees);
        let target = resolve_target(&removable, name_or_branch).map_err(wrap)?.path.clone();

        if self.config.docker.enabled {
            let compose_file = &self.config.docker.compose_file;
            if target.join(compose_file).exists() {
                info!("Stopping services in {}", target.display());
                if let Err(e) = self.containers.stop_services(&target, compose_file).await {
                    warn!("Failed to stop services in {}: {}", target.display(), e);
                }
            }
        }

        self.vcs.remove(&target, force).await.map_err(wrap)?;
        info!("Worktree '{}' removed", name_or_branch);
        Ok(target)
    }
}

fn absolute_root(root: PathBuf) -> PathBuf {
    std::path::absolute(&root).unwrap_or(root)
}

/// Linked worktrees only. git always lists the main working tree first.
fn removable_worktrees(worktrees: &[WorktreeRecord]) -> Vec<WorktreeRecord> {
    worktrees.iter().skip(1).filter(|wt| !wt.bare).cloned().collect()
}

/// Find exactly one worktree by directory name or branch.
fn resolve_target<'a>(worktrees: &'a [WorktreeRecord], name_or_branch: &str) -> Result<&'a WorktreeRecord> {
    let mut matches: Vec<&WorktreeRecord> = worktrees.iter().filter(|wt| wt.matches(name_or_branch)).collect();
    matches.dedup_by(|a, b| a.path == b.path);

    match matches.as_slice() {
        [] => Err(GroveError::WorktreeNotFound(name_or_branch.to_string())),
        [single] => Ok(*single),
        many => Err(GroveError::AmbiguousWorktree {
            name: name_or_branch.to_string(),
            candidates: many.iter().map(|wt| wt.path.clone()).collect(),
        }),
    }
}
