//! venvstamp CLI - incremental virtualenv provisioning
//!
//! Usage: venvstamp <COMMAND>
//!
//! Commands:
//!   ensure  Provision the environment if the manifest changed
//!   status  Report whether a rebuild is needed
//!   clean   Delete the sentinel (and optionally the environment)

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use venvstamp::{Config, InvalidEnvPolicy, Outcome, Provisioner, SystemRunner};

use cli::{Cli, Commands, PathArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let (mut config, warnings) = Config::load_layered(cli.config.as_deref(), &cwd)
        .context("Failed to load configuration")?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    match cli.command {
        Commands::Ensure {
            paths,
            python,
            on_invalid_env,
        } => {
            apply_paths(&mut config, paths);
            cmd_ensure(config, python, on_invalid_env)
        }
        Commands::Status { paths, json } => {
            apply_paths(&mut config, paths);
            cmd_status(config, json)
        }
        Commands::Clean { paths, env } => {
            apply_paths(&mut config, paths);
            cmd_clean(config, env)
        }
    }
}

/// Log level from `-v` count; `RUST_LOG` wins when set.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .init();
}

fn apply_paths(config: &mut Config, paths: PathArgs) {
    if let Some(manifest) = paths.manifest {
        config.paths.manifest = manifest;
    }
    if let Some(sentinel) = paths.sentinel {
        config.paths.sentinel = sentinel;
    }
    if let Some(env_dir) = paths.env_dir {
        config.paths.env_dir = env_dir;
    }
}

fn cmd_ensure(
    mut config: Config,
    python: Option<PathBuf>,
    on_invalid_env: Option<InvalidEnvPolicy>,
) -> Result<()> {
    if let Some(python) = python {
        config.python.interpreter = python;
    }
    if let Some(policy) = on_invalid_env {
        config.environment.on_invalid = policy;
    }

    let runner = SystemRunner;
    let provisioner = Provisioner::new(config, &runner);
    let env_dir = provisioner.layout().env_dir.display().to_string();

    match provisioner.ensure()? {
        Outcome::UpToDate => println!("{} is up to date", env_dir),
        Outcome::Provisioned { created_env: true } => {
            println!("Created and provisioned {}", env_dir)
        }
        Outcome::Provisioned { created_env: false } => println!("Provisioned {}", env_dir),
    }
    Ok(())
}

fn cmd_status(config: Config, json: bool) -> Result<()> {
    let runner = SystemRunner;
    let provisioner = Provisioner::new(config, &runner);
    let status = provisioner.status()?;
    let layout = provisioner.layout();

    if json {
        let value = serde_json::json!({
            "stale": status.staleness.is_stale(),
            "reason": status.staleness.reason(),
            "manifest": layout.manifest,
            "sentinel": layout.sentinel,
            "env_dir": layout.env_dir,
            "env": status.env.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if status.staleness.is_stale() {
        println!("stale: {}", status.staleness);
        println!("environment: {} ({})", layout.env_dir.display(), status.env.as_str());
    } else {
        println!(
            "fresh: {} is up to date with {}",
            layout.sentinel.display(),
            layout.manifest.display()
        );
    }

    if status.staleness.is_stale() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_clean(config: Config, env: bool) -> Result<()> {
    let runner = SystemRunner;
    let provisioner = Provisioner::new(config, &runner);
    let report = provisioner.clean(env)?;
    let layout = provisioner.layout();

    if report.removed_sentinel {
        println!("Removed {}", layout.sentinel.display());
    }
    if report.removed_env {
        println!("Removed {}", layout.env_dir.display());
    }
    if !report.removed_sentinel && !report.removed_env {
        println!("Nothing to clean");
    }
    Ok(())
}
