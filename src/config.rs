//! Configuration for Grove
//!
//! Loaded once per process from YAML and never mutated afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{GroveError, Result};
use crate::naming::DEFAULT_PORT_RANGE_SIZE;
use crate::template::TemplateValue;

/// Directory inside the repository that holds config and template sources.
pub const GROVE_DIR: &str = ".grove";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub project: ProjectConfig,
    pub worktree: WorktreeConfig,
    pub docker: DockerConfig,
    pub web: WebConfig,
    pub templates: TemplatesConfig,
    pub variables: BTreeMap<String, TemplateValue>,
    pub commands: CommandsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub domain: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "myapp".to_string(),
            domain: "app.lvh.me".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorktreeConfig {
    pub base_path: String,
    pub naming_pattern: String,
}

impl Default for WorktreeConfig {
    fn default() -> Self {
        Self {
            base_path: "./worktrees".to_string(),
            naming_pattern: "{branch}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub enabled: bool,
    pub compose_file: String,
    #[serde(alias = "port_offset")]
    pub port_range_start: u32,
    pub port_range_size: u32,
    pub network_name: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            compose_file: "docker-compose.yml".to_string(),
            port_range_start: 10000,
            port_range_size: DEFAULT_PORT_RANGE_SIZE,
            network_name: "{project_name}_network".to_string(),
        }
    }
}

impl DockerConfig {
    /// Network name with `{project_name}` substituted.
    pub fn resolved_network_name(&self, project: &ProjectConfig) -> String {
        self.network_name.replace("{project_name}", &project.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub enabled: bool,
    pub proxy_type: String,
    pub subdomain_pattern: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            proxy_type: "nginx-proxy".to_string(),
            subdomain_pattern: "{branch}.{project_domain}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Set used when a creation request names none
    pub default: String,
    pub available: BTreeMap<String, TemplateSet>,
}

/// Ordered source -> destination mappings rendered together.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateSet {
    pub files: Vec<TemplateFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateFile {
    /// Relative to `.grove/templates`
    pub src: String,
    /// Relative to the worktree root
    pub dest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Budget for every git/docker invocation
    pub timeout_ms: u64,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self { timeout_ms: 120000 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            project: ProjectConfig::default(),
            worktree: WorktreeConfig::default(),
            docker: DockerConfig::default(),
            web: WebConfig::default(),
            templates: TemplatesConfig::default(),
            variables: BTreeMap::new(),
            commands: CommandsConfig::default(),
        }
    }
}

impl TemplatesConfig {
    /// Pick the set for a creation request.
    ///
    /// `Ok(None)` when no sets are configured at all; an empty `name` falls back
    /// to `default`. A selection that names no configured set is an error.
    pub fn resolve(&self, name: &str) -> Result<Option<(&str, &TemplateSet)>> {
        if self.available.is_empty() {
            return Ok(None);
        }
        let selected = if name.is_empty() { self.default.as_str() } else { name };
        if selected.is_empty() {
            return Err(GroveError::Config(
                "no template set requested and no default configured".to_string(),
            ));
        }
        self.available
            .get_key_value(selected)
            .map(|(key, set)| Some((key.as_str(), set)))
            .ok_or_else(|| GroveError::Config(format!("template set '{}' not found", selected)))
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// An explicit path must load. Otherwise `<repo_root>/.grove/config.yaml`,
    /// then `~/.config/grove/grove.yml`, then defaults.
    pub fn load(config_path: Option<&Path>, repo_root: &Path) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let repo_config = repo_root.join(GROVE_DIR).join("config.yaml");
        if repo_config.exists() {
            return Self::load_from_file(&repo_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let user_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| GroveError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_yaml(&content)?;
        info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the manager cannot act on.
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(GroveError::Config("project.name must not be empty".to_string()));
        }
        if self.docker.port_range_size == 0 {
            return Err(GroveError::Config("docker.port_range_size must be at least 1".to_string()));
        }
        let last_port = u64::from(self.docker.port_range_start) + u64::from(self.docker.port_range_size) - 1;
        if last_port > u64::from(u16::MAX) {
            return Err(GroveError::Config(format!(
                "docker port range {}..={} exceeds {}",
                self.docker.port_range_start,
                last_port,
                u16::MAX
            )));
        }
        if !self.templates.default.is_empty() && !self.templates.available.contains_key(&self.templates.default) {
            return Err(GroveError::Config(format!(
                "templates.default '{}' is not an available template set",
                self.templates.default
            )));
        }
        for (name, set) in &self.templates.available {
            for file in &set.files {
                for rel in [&file.src, &file.dest] {
                    if rel.is_empty() || Path::new(rel).is_absolute() {
                        return Err(GroveError::Config(format!(
                            "template set '{}' has an invalid path '{}', expected a relative path",
                            name, rel
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Directory holding template sources for a repository.
    pub fn templates_dir(repo_root: &Path) -> PathBuf {
        repo_root.join(GROVE_DIR).join("templates")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL_CONFIG: &str = r#"
version: 1
project:
  name: testapp
  domain: app.test
worktree:
  base_path: ./worktrees
  naming_pattern: "{branch}"
docker:
  enabled: true
  compose_file: docker-compose.yml
  port_offset: 20000
  network_name: "{project_name}_network"
web:
  enabled: true
  proxy_type: nginx-proxy
  subdomain_pattern: "{branch}.{project_domain}"
templates:
  default: standard
  available:
    standard:
      files:
        - src: docker-compose.yml.tmpl
          dest: docker-compose.yml
        - src: env.tmpl
          dest: .env
variables:
  db_name_prefix: testapp
  replicas: 2
  debug: true
"#;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.project.name, "myapp");
        assert_eq!(config.project.domain, "app.lvh.me");
        assert_eq!(config.worktree.base_path, "./worktrees");
        assert_eq!(config.docker.port_range_start, 10000);
        assert_eq!(config.docker.port_range_size, 1000);
        assert!(config.docker.enabled);
        assert!(config.web.enabled);
        assert!(config.templates.available.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_yaml(FULL_CONFIG).unwrap();
        assert_eq!(config.project.name, "testapp");
        assert_eq!(config.docker.port_range_start, 20000);
        assert_eq!(config.docker.port_range_size, 1000);
        assert_eq!(config.templates.default, "standard");

        let set = &config.templates.available["standard"];
        assert_eq!(set.files.len(), 2);
        assert_eq!(set.files[0].src, "docker-compose.yml.tmpl");
        assert_eq!(set.files[1].dest, ".env");

        assert_eq!(config.variables["db_name_prefix"], TemplateValue::String("testapp".to_string()));
        assert_eq!(config.variables["replicas"], TemplateValue::Integer(2));
        assert_eq!(config.variables["debug"], TemplateValue::Bool(true));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_yaml("project:\n  name: shop\n").unwrap();
        assert_eq!(config.project.name, "shop");
        assert_eq!(config.project.domain, "app.lvh.me");
        assert_eq!(config.commands.timeout_ms, 120000);
    }

    #[test]
    fn test_resolved_network_name() {
        let config = Config::from_yaml(FULL_CONFIG).unwrap();
        assert_eq!(config.docker.resolved_network_name(&config.project), "testapp_network");
    }

    #[test]
    fn test_validate_rejects_empty_project_name() {
        let result = Config::from_yaml("project:\n  name: \"\"\n");
        assert!(matches!(result, Err(GroveError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_port_range() {
        let result = Config::from_yaml("docker:\n  port_range_size: 0\n");
        assert!(matches!(result, Err(GroveError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_port_overflow() {
        let result = Config::from_yaml("docker:\n  port_range_start: 65000\n  port_range_size: 1000\n");
        assert!(matches!(result, Err(GroveError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_default_set() {
        let result = Config::from_yaml("templates:\n  default: missing\n");
        assert!(matches!(result, Err(GroveError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_absolute_template_path() {
        let yaml = "templates:\n  available:\n    web:\n      files:\n        - src: /etc/passwd\n          dest: out\n";
        assert!(matches!(Config::from_yaml(yaml), Err(GroveError::Config(_))));
    }

    #[test]
    fn test_resolve_explicit_and_default() {
        let config = Config::from_yaml(FULL_CONFIG).unwrap();
        let (name, set) = config.templates.resolve("").unwrap().unwrap();
        assert_eq!(name, "standard");
        assert_eq!(set.files.len(), 2);

        let (name, _) = config.templates.resolve("standard").unwrap().unwrap();
        assert_eq!(name, "standard");
    }

    #[test]
    fn test_resolve_unknown_set_fails() {
        let config = Config::from_yaml(FULL_CONFIG).unwrap();
        assert!(matches!(config.templates.resolve("nope"), Err(GroveError::Config(_))));
    }

    #[test]
    fn test_resolve_no_sets_is_skipped() {
        let config = Config::default();
        assert!(config.templates.resolve("").unwrap().is_none());
        assert!(config.templates.resolve("anything").unwrap().is_none());
    }

    #[test]
    fn test_resolve_no_name_no_default_fails() {
        let mut config = Config::from_yaml(FULL_CONFIG).unwrap();
        config.templates.default.clear();
        assert!(matches!(config.templates.resolve(""), Err(GroveError::Config(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        fs::write(&path, FULL_CONFIG).unwrap();

        let config = Config::load(Some(path.as_path()), temp.path()).unwrap();
        assert_eq!(config.project.name, "testapp");
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(temp.path().join("nope.yaml").as_path()), temp.path());
        assert!(matches!(result, Err(GroveError::Config(_))));
    }

    #[test]
    fn test_load_repo_config() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(GROVE_DIR)).unwrap();
        fs::write(temp.path().join(GROVE_DIR).join("config.yaml"), FULL_CONFIG).unwrap();

        let config = Config::load(None, temp.path()).unwrap();
        assert_eq!(config.project.domain, "app.test");
    }

    #[test]
    fn test_templates_dir() {
        assert_eq!(
            Config::templates_dir(Path::new("/repo")),
            PathBuf::from("/repo/.grove/templates")
        );
    }
}
