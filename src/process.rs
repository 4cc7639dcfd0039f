//! External command execution
//!
//! Every git and docker invocation goes through [`run`], which captures
//! combined output and enforces a timeout. Children are killed when the
//! returned future is dropped, so dropping an operation cancels it.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use log::debug;
use tokio::process::Command;

use crate::error::{GroveError, Result};

/// Exit status plus stdout/stderr of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr, trimmed; the text surfaced in error messages.
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len());
        combined.push_str(self.stdout.trim_end());
        if !combined.is_empty() && !self.stderr.trim().is_empty() {
            combined.push('\n');
        }
        combined.push_str(self.stderr.trim_end());
        combined
    }
}

/// Run `program args..` in `cwd`, waiting at most `timeout`.
///
/// A non-zero exit is not an error here; callers decide what it means.
/// Failure to spawn is `Io`, expiry is `Timeout`.
pub async fn run(program: &str, args: &[&str], cwd: &Path, timeout: Duration) -> Result<CommandOutput> {
    let display = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    debug!("Running `{}` in {}", display, cwd.display());

    let child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(GroveError::Timeout {
                command: display,
                timeout_ms: timeout.as_millis() as u64,
            });
        }
    };

    let result = CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };
    debug!("`{}` exited with {}", display, output.status);
    Ok(result)
}
