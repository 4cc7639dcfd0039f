use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::naming::{allocate_port, sanitize};

use super::value::TemplateValue;

/// Variables available to a template set. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TemplateContext(BTreeMap<String, TemplateValue>);

impl TemplateContext {
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, TemplateValue)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (String, TemplateValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Assembles the [`TemplateContext`] for one worktree.
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder<'a> {
    config: &'a Config,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Standard keys first, docker keys when enabled, then `variables` on top.
    pub fn build(&self, worktree_path: &Path, raw_branch: &str) -> TemplateContext {
        let config = self.config;
        let safe_branch = sanitize(raw_branch);
        let mut vars = BTreeMap::new();

        vars.insert("BranchName".to_string(), TemplateValue::from(safe_branch.as_str()));
        vars.insert("OriginalBranchName".to_string(), TemplateValue::from(raw_branch));
        vars.insert(
            "WorktreePath".to_string(),
            TemplateValue::from(worktree_path.display().to_string()),
        );
        vars.insert("ProjectName".to_string(), TemplateValue::from(config.project.name.as_str()));
        vars.insert("ProjectDomain".to_string(), TemplateValue::from(config.project.domain.as_str()));

        if config.docker.enabled {
            vars.insert(
                "NetworkName".to_string(),
                TemplateValue::from(config.docker.resolved_network_name(&config.project)),
            );
            let port = allocate_port(&safe_branch, config.docker.port_range_start, config.docker.port_range_size);
            vars.insert("WebPort".to_string(), TemplateValue::from(port));
        }

        for (key, value) in &config.variables {
            vars.insert(key.clone(), value.clone());
        }

        TemplateContext(vars)
    }
}
