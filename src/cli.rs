use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use venvstamp::InvalidEnvPolicy;

/// venvstamp - rebuild a virtualenv only when its requirements change
#[derive(Parser, Debug)]
#[command(name = "venvstamp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ./venvstamp.toml, then the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the three rule paths
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Requirements manifest the environment is built from
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Sentinel file marking the last successful install
    #[arg(short, long)]
    pub sentinel: Option<PathBuf>,

    /// Virtual environment directory
    #[arg(short, long)]
    pub env_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision the environment if the manifest changed since the last install
    Ensure {
        #[command(flatten)]
        paths: PathArgs,

        /// Interpreter used to create the environment
        #[arg(long)]
        python: Option<PathBuf>,

        /// What to do when the environment directory is not a virtualenv
        #[arg(long, value_name = "fail|recreate")]
        on_invalid_env: Option<InvalidEnvPolicy>,
    },

    /// Report whether a rebuild is needed (exit 1 when stale)
    Status {
        #[command(flatten)]
        paths: PathArgs,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Delete the sentinel to force the next `ensure` to rebuild
    Clean {
        #[command(flatten)]
        paths: PathArgs,

        /// Also delete the environment directory
        #[arg(long)]
        env: bool,
    },
}
