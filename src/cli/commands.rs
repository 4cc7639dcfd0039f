//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - create: provision a worktree for a branch
//! - list: list worktrees
//! - remove: remove a worktree and stop its services
//! - switch: print a worktree path for shell integration
//! - version: print version information

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Git worktree manager with Docker and template support
#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default is .grove/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Repository root (default is the current directory)
    #[arg(short = 'C', long, global = true)]
    pub repo: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Output format for `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Table,
    Json,
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new worktree from a branch
    Create {
        /// Branch to check out (created when missing)
        branch: String,

        /// Base branch to create from
        #[arg(long, default_value = "main")]
        from: String,

        /// Template set to render (default from config)
        #[arg(short, long, default_value = "")]
        template: String,
    },

    /// List all worktrees
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },

    /// Remove a worktree and its associated resources
    Remove {
        /// Worktree directory name or branch
        name: String,

        /// Force removal even if there are uncommitted changes
        #[arg(short, long)]
        force: bool,
    },

    /// Print the path of a worktree (for `cd "$(grove switch x)"`)
    Switch {
        /// Worktree directory name or branch
        name: String,
    },

    /// Print version information
    Version,
}

/// Version line for `grove version`.
///
/// Commit and build date come from `GROVE_GIT_COMMIT` and `GROVE_BUILD_DATE`
/// at compile time and read `unknown` when the build does not set them.
pub fn version_banner() -> String {
    format!(
        "grove version {} (commit: {}, built: {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GROVE_GIT_COMMIT").unwrap_or("unknown"),
        option_env!("GROVE_BUILD_DATE").unwrap_or("unknown"),
    )
}
