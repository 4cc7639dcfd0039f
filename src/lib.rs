//! Grove - per-branch development environments on git worktrees
//!
//! For each branch Grove adds a git worktree, renders environment-specific
//! files from templates, assigns a deterministic port, and optionally ensures a
//! Docker network and computes a proxy subdomain.

pub mod config;
pub mod container;
pub mod error;
pub mod naming;
pub mod process;
pub mod provision;
pub mod proxy;
pub mod template;
pub mod worktree;

pub use error::{GroveError, ProvisionStep, Result};
