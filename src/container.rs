//! Docker integration
//!
//! Grove only makes sure the shared network exists and, on removal, asks
//! compose to stop a worktree's services. It never starts containers.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};

use crate::error::{GroveError, Result};
use crate::process;

/// Container operations the provisioner needs.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create `network` unless it already exists.
    async fn ensure_network(&self, network: &str) -> Result<()>;

    /// Stop the compose services defined by `compose_file` in `worktree`.
    async fn stop_services(&self, worktree: &Path, compose_file: &str) -> Result<()>;
}

/// Talks to the `docker` CLI.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
    timeout: Duration,
}

impl DockerCli {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "docker".to_string(),
            timeout,
        }
    }

    /// Use a different docker-compatible binary (e.g. `podman`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

/// A lost create race reports the network as already present.
fn is_already_exists(output: &str) -> bool {
    output.to_lowercase().contains("already exists")
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn ensure_network(&self, network: &str) -> Result<()> {
        let inspect = process::run(&self.program, &["network", "inspect", network], Path::new("."), self.timeout).await?;
        if inspect.success {
            debug!("Network {} already exists", network);
            return Ok(());
        }

        let create = process::run(&self.program, &["network", "create", network], Path::new("."), self.timeout).await?;
        if create.success {
            info!("Created network {}", network);
            return Ok(());
        }

        let combined = create.combined();
        if is_already_exists(&combined) {
            debug!("Network {} was created concurrently", network);
            return Ok(());
        }
        Err(GroveError::Container(combined))
    }

    async fn stop_services(&self, worktree: &Path, compose_file: &str) -> Result<()> {
        let output = process::run(
            &self.program,
            &["compose", "-f", compose_file, "down"],
            worktree,
            self.timeout,
        )
        .await?;
        if !output.success {
            return Err(GroveError::Container(output.combined()));
        }
        info!("Stopped services in {}", worktree.display());
        Ok(())
    }
}
