//! Name derivation for worktrees
//!
//! Turns branch identifiers into filesystem/DNS-safe tokens and maps those
//! tokens onto deterministic ports.

use std::path::{Path, PathBuf};

use crate::config::Config;

/// Default number of ports a branch name can hash into.
pub const DEFAULT_PORT_RANGE_SIZE: u32 = 1000;

/// Make a branch name safe for use as a path segment and a DNS label.
///
/// `feature/User_Auth` becomes `feature-user-auth`. Uppercase characters with
/// no lowercase form (mathematical letters such as `𝐀`) become `-`.
pub fn sanitize(raw: &str) -> String {
    raw.replace('/', "-")
        .replace('_', "-")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_uppercase() { '-' } else { c })
        .collect()
}

/// Map a sanitized name onto a port in `[range_start, range_start + range_size)`.
///
/// Polynomial hash over the name's characters, so the same name always lands
/// on the same port. Distinct names may collide; nothing here detects that.
/// A `range_size` of zero yields `range_start`.
pub fn allocate_port(sanitized: &str, range_start: u32, range_size: u32) -> u32 {
    if range_size == 0 {
        return range_start;
    }
    let size = u64::from(range_size);
    let hash = sanitized
        .chars()
        .fold(0u64, |hash, c| (hash * 31 + u64::from(c as u32)) % size);
    range_start + hash as u32
}

/// Directory name of a worktree, from the configured naming pattern.
pub fn worktree_dir_name(config: &Config, sanitized: &str) -> String {
    config
        .worktree
        .naming_pattern
        .replace("{branch}", sanitized)
        .replace("{project_name}", &config.project.name)
}

/// Directory that holds all worktrees; relative base paths hang off the repo root.
pub fn worktree_base(config: &Config, repo_root: &Path) -> PathBuf {
    let base = Path::new(&config.worktree.base_path);
    if base.is_absolute() {
        base.to_path_buf()
    } else {
        repo_root.join(base.strip_prefix(".").unwrap_or(base))
    }
}

/// Full destination path of the worktree for a raw branch name.
pub fn worktree_path(config: &Config, repo_root: &Path, raw_branch: &str) -> PathBuf {
    worktree_base(config, repo_root).join(worktree_dir_name(config, &sanitize(raw_branch)))
}
