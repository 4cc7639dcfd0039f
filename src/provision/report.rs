use std::path::PathBuf;

use crate::error::{GroveError, ProvisionStep};
use crate::proxy::ProxyRoute;

/// What a creation request did, step by step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub branch: String,
    pub sanitized: String,
    pub worktree_path: PathBuf,
    /// Steps that took effect, in order
    pub completed: Vec<ProvisionStep>,
    pub template_set: Option<String>,
    pub rendered: Vec<PathBuf>,
    pub network: Option<String>,
    /// Compose file inside the worktree, when the templates produced one
    pub compose_file: Option<PathBuf>,
    pub route: Option<ProxyRoute>,
}

impl ProvisionReport {
    pub(crate) fn new(branch: &str, sanitized: String, worktree_path: PathBuf) -> Self {
        Self {
            branch: branch.to_string(),
            sanitized,
            worktree_path,
            completed: vec![ProvisionStep::Init],
            template_set: None,
            rendered: Vec::new(),
            network: None,
            compose_file: None,
            route: None,
        }
    }

    pub(crate) fn commit(&mut self, step: ProvisionStep) {
        self.completed.push(step);
    }

    /// Wrap a step failure with the steps committed so far.
    pub(crate) fn fail(&self, step: ProvisionStep, source: GroveError) -> GroveError {
        GroveError::Provision {
            step,
            completed: self.completed.clone(),
            source: Box::new(source),
        }
    }

    pub fn is_completed(&self, step: ProvisionStep) -> bool {
        self.completed.contains(&step)
    }
}
