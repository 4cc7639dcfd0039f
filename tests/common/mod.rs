//! Shared fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

pub fn git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git").args(args).current_dir(repo).output().unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// A repository with one commit on `main`.
pub fn setup_test_repo() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repo");
    fs::create_dir(&repo).unwrap();

    git(&repo, &["init", "-b", "main"]);
    git(&repo, &["config", "user.email", "test@test.com"]);
    git(&repo, &["config", "user.name", "Test"]);
    git(&repo, &["config", "commit.gpgsign", "false"]);

    fs::write(repo.join("README.md"), "# Test").unwrap();
    fs::write(repo.join(".gitignore"), "worktrees/\n").unwrap();
    git(&repo, &["add", "."]);
    git(&repo, &["commit", "-m", "Initial commit"]);

    (temp, repo)
}

/// Config plus two template sources under `.grove/`.
pub const CONFIG_YAML: &str = r#"
version: 1
project:
  name: shop
  domain: shop.test
worktree:
  base_path: ./worktrees
  naming_pattern: "{branch}"
docker:
  enabled: true
  compose_file: docker-compose.yml
  port_range_start: 10000
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
  db_name_prefix: shop
"#;

pub fn write_grove_dir(repo: &Path) {
    let templates = repo.join(".grove").join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(repo.join(".grove").join("config.yaml"), CONFIG_YAML).unwrap();
    fs::write(
        templates.join("docker-compose.yml.tmpl"),
        "services:\n  web:\n    ports:\n      - \"{{WebPort}}:80\"\n    environment:\n      VIRTUAL_HOST: {{BranchName}}.{{ProjectDomain}}\nnetworks:\n  default:\n    name: {{NetworkName}}\n",
    )
    .unwrap();
    fs::write(
        templates.join("env.tmpl"),
        "BRANCH={{OriginalBranchName}}\nDB_NAME={{db_name_prefix}}_{{BranchName}}\nWORKTREE={{WorktreePath}}\nPROJECT={{ProjectName}}\n",
    )
    .unwrap();
}
