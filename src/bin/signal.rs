// SPDX-FileCopyrightText: 2025 SOTAOI <dev@sotaoi.io>
// SPDX-License-Identifier: MIT

use signal::{
    config::SignalConfig,
    deploy::DeployTarget,
    path::{config_file, sotaoi_base_dir},
    registry::VersionRegistry,
    replicate::replicate,
    scaffold::{self, TemplateSource},
};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  signal [options] <signal-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Unpack(opts) => run_unpack(opts),
            Command::Create(opts) => run_create(opts),
            Command::Versions => run_versions(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Unpack SOTAOI with the given version.
    #[command(override_usage = "signal unpack [sotaoi_version] [deployment_path]")]
    Unpack(UnpackOptions),

    /// Create a fresh SOTAOI deployment from a template repository.
    #[command(override_usage = "signal create [sotaoi_repo] [deployment_path]")]
    Create(CreateOptions),

    /// List available SOTAOI versions.
    #[command(override_usage = "signal versions")]
    Versions,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UnpackOptions {
    /// SOTAOI version.
    #[arg(value_name = "sotaoi_version")]
    pub sotaoi_version: Option<String>,

    /// Directory path for deployment.
    #[arg(value_name = "deployment_path")]
    pub deployment_path: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CreateOptions {
    /// Template repository URL, or "new" for the default template.
    #[arg(value_name = "sotaoi_repo")]
    pub sotaoi_repo: Option<String>,

    /// Directory path for deployment.
    #[arg(value_name = "deployment_path")]
    pub deployment_path: Option<PathBuf>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_unpack(opts: UnpackOptions) -> Result<()> {
    let target = DeployTarget::resolve(opts.deployment_path.as_deref())?;
    let version = match opts.sotaoi_version.as_deref() {
        Some(version) if !version.is_empty() => version,
        _ => bail!("failed to unpack SOTAOI, bad version argument"),
    };

    let registry = VersionRegistry::open(base_dir()?)?;
    let Some(version_root) = registry.lookup(version) else {
        bail!("failed to unpack SOTAOI, given version does not exist");
    };

    replicate(version_root, target.as_path())?;
    info!("unpacked SOTAOI {version} into {target}");

    Ok(())
}

fn run_create(opts: CreateOptions) -> Result<()> {
    let source = match opts.sotaoi_repo.as_deref() {
        Some(repo) if !repo.is_empty() => TemplateSource::from_arg(repo),
        _ => bail!("failed to create SOTAOI deployment, bad repository argument"),
    };
    let target = DeployTarget::resolve(opts.deployment_path.as_deref())?;

    let config = SignalConfig::load(config_file()?)?;
    let url = source.remote_url(&config.settings.default_remote);
    scaffold::clone_template(&url, &target)?;
    scaffold::relayout(target.as_path())?;
    scaffold::bootstrap(target.as_path(), &config.settings.bootstrap_command)?;
    info!("created SOTAOI deployment at {target}");

    Ok(())
}

fn run_versions() -> Result<()> {
    let registry = VersionRegistry::open(base_dir()?)?;
    for name in registry.names() {
        println!("{name}");
    }

    Ok(())
}

fn base_dir() -> Result<PathBuf> {
    let config = SignalConfig::load(config_file()?)?;
    match config.settings.base_dir {
        Some(base_dir) => Ok(base_dir),
        None => Ok(sotaoi_base_dir()?),
    }
}
