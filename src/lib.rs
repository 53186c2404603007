//! venvstamp - incremental virtualenv provisioning
//!
//! Rebuilds a Python virtual environment from a requirements manifest only
//! when the manifest is newer than a sentinel file recording the last
//! successful install.

pub mod config;
pub mod environment;
pub mod error;
pub mod graph;
pub mod provisioner;
pub mod runner;
pub mod sentinel;

// Re-exports for convenience
pub use config::{Config, InvalidEnvPolicy};
pub use environment::{EnvState, Environment};
pub use error::{ProvisionError, ProvisionResult, Step};
pub use graph::{BuildGraph, BuildReport, Producer, Rule, Staleness};
pub use provisioner::{ensure, CleanReport, Layout, Outcome, Provisioner, Status};
pub use runner::{CommandRunner, StepCommand, SystemRunner};
