//! CLI module for grove - command-line interface and subcommands.
//!
//! Parses arguments and hands already-validated strings to the provisioner.

pub mod commands;

pub use commands::Cli;
