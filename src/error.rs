//! Error types for Grove
//!
//! Centralized error handling using thiserror.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A step of the provisioning sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    Init,
    VcsCreate,
    TemplateRender,
    ContainerSetup,
    ProxySetup,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisionStep::Init => "init",
            ProvisionStep::VcsCreate => "vcs-create",
            ProvisionStep::TemplateRender => "template-render",
            ProvisionStep::ContainerSetup => "container-setup",
            ProvisionStep::ProxySetup => "proxy-setup",
        };
        write!(f, "{}", name)
    }
}

/// All error types that can occur in Grove
#[derive(Debug, Error)]
pub enum GroveError {
    /// Missing or unresolvable configuration (e.g. unknown template set)
    #[error("Config error: {0}")]
    Config(String),

    /// Non-zero exit from git; carries the captured output verbatim
    #[error("Git error: {0}")]
    Vcs(String),

    /// Template could not be read, parsed or fully resolved
    #[error("Template error: {0}")]
    Template(String),

    /// Docker network tooling failure
    #[error("Container error: {0}")]
    Container(String),

    /// External command exceeded its time budget
    #[error("Command '{command}' timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    /// No worktree matched a name or branch
    #[error("Worktree '{0}' not found")]
    WorktreeNotFound(String),

    /// More than one worktree matched a name or branch
    #[error("Worktree '{name}' is ambiguous, candidates: {}", format_candidates(.candidates))]
    AmbiguousWorktree { name: String, candidates: Vec<PathBuf> },

    /// Failure while stopping services or removing a resolved worktree
    #[error("Failed to remove worktree '{target}': {source}")]
    Removal {
        target: String,
        #[source]
        source: Box<GroveError>,
    },

    /// First failing step of a creation request
    #[error("Provisioning failed at {step}: {source}")]
    Provision {
        step: ProvisionStep,
        completed: Vec<ProvisionStep>,
        #[source]
        source: Box<GroveError>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl GroveError {
    /// Unwrap `Provision` and `Removal` layers down to the underlying failure.
    pub fn root_cause(&self) -> &GroveError {
        match self {
            GroveError::Provision { source, .. } | GroveError::Removal { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for Grove operations
pub type Result<T> = std::result::Result<T, GroveError>;
