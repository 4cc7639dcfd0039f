use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

mod cli;

use cli::Cli;
use cli::commands::{Commands, ListFormat, version_banner};
use grove::config::{CommandsConfig, Config};
use grove::provision::{EnvironmentProvisioner, ProvisionReport};
use grove::worktree::{GitWorktrees, WorktreeRecord};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("grove")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("grove.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, provisioner: &EnvironmentProvisioner) -> Result<()> {
    if cli.is_verbose() {
        eprintln!("{} {}", "Repository:".yellow(), provisioner.repo_root().display());
    }

    match &cli.command {
        Commands::Create { branch, from, template } => {
            println!("Creating worktree for branch {}...", branch.cyan());
            let report = provisioner.create_worktree(branch, from, template).await?;
            print_report(&report);
        }
        Commands::List { format } => {
            let worktrees = provisioner.list_worktrees().await?;
            print_worktrees(&worktrees, *format)?;
        }
        Commands::Remove { name, force } => {
            println!("Removing worktree {}...", name.cyan());
            let path = provisioner.remove_worktree(name, *force).await?;
            println!("{} Worktree '{}' removed ({})", "✓".green(), name, path.display());
        }
        Commands::Switch { name } => {
            let path = provisioner.worktree_path(name).await?;
            println!("{}", path.display());
        }
        Commands::Version => print_version(),
    }
    Ok(())
}

fn print_version() {
    println!("{}", version_banner());
}

fn print_report(report: &ProvisionReport) {
    println!("{} Worktree ready at {}", "✓".green(), report.worktree_path.display());
    for file in &report.rendered {
        println!("  {} {}", "rendered".dimmed(), file.display());
    }
    if let Some(network) = &report.network {
        println!("  {} {}", "network".dimmed(), network);
    }
    if let Some(compose) = &report.compose_file {
        println!("Docker Compose file created at: {}", compose.display());
        println!("Run 'docker compose up -d' in the worktree to start containers");
    }
    if let Some(route) = &report.route {
        println!("Web URL: {}", route.url.cyan());
    }
}

fn print_worktrees(worktrees: &[WorktreeRecord], format: ListFormat) -> Result<()> {
    match format {
        ListFormat::Json => {
            println!("{}", serde_json::to_string_pretty(worktrees)?);
        }
        ListFormat::Table => {
            let width = worktrees.iter().map(|wt| wt.name().len()).max().unwrap_or(0).max(4);
            let header = format!("{:<width$}  {:<30}  {}", "NAME", "BRANCH", "PATH");
            println!("{}", header.bold());
            for wt in worktrees {
                let branch = format!("{:<30}", if wt.branch.is_empty() { "(detached)" } else { wt.branch.as_str() });
                let branch = if wt.branch.is_empty() { branch.dimmed() } else { branch.normal() };
                println!("{:<width$}  {}  {}", wt.name(), branch, wt.path.display());
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    let start = match &cli.repo {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let discovery_timeout = Duration::from_millis(CommandsConfig::default().timeout_ms);
    let repo_root = GitWorktrees::discover(&start, discovery_timeout)
        .await
        .with_context(|| format!("Not inside a git repository: {}", start.display()))?
        .repo_root()
        .to_path_buf();

    let config = Config::load(cli.config.as_deref(), &repo_root).context("Failed to load configuration")?;
    info!("Starting with config from: {:?}", cli.config);

    let provisioner = EnvironmentProvisioner::new(config, repo_root);
    run_application(&cli, &provisioner).await.context("Command failed")?;

    Ok(())
}
