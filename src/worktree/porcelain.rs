use std::path::PathBuf;

use super::WorktreeRecord;

/// Parse `git worktree list --porcelain` output.
///
/// Records start at a `worktree <path>` line and end at a blank line, the next
/// `worktree` line, or end of input. `HEAD`, `branch`, `bare` and `detached`
/// are picked up when present; anything else (`locked`, `prunable`) is skipped.
pub fn parse_porcelain(output: &str) -> Vec<WorktreeRecord> {
    let mut records = Vec::new();
    let mut current: Option<WorktreeRecord> = None;

    for line in output.lines() {
        let line = line.trim_end_matches('\r');

        if let Some(path) = line.strip_prefix("worktree ") {
            records.extend(current.take());
            current = Some(WorktreeRecord {
                path: PathBuf::from(path),
                ..Default::default()
            });
            continue;
        }

        if line.is_empty() {
            records.extend(current.take());
            continue;
        }

        let Some(record) = current.as_mut() else {
            continue;
        };

        if let Some(head) = line.strip_prefix("HEAD ") {
            record.head = Some(head.to_string());
        } else if let Some(reference) = line.strip_prefix("branch ") {
            record.branch = reference.strip_prefix("refs/heads/").unwrap_or(reference).to_string();
        } else if line == "bare" {
            record.bare = true;
        } else if line == "detached" {
            record.detached = true;
        }
    }

    records.extend(current);
    records
}
