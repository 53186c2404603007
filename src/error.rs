//! Error types for venvstamp
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

/// Result type alias for venvstamp operations
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Which provisioning sub-step a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateEnvironment,
    UpgradeBootstrap,
    InstallManifest,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::CreateEnvironment => "create environment",
            Step::UpgradeBootstrap => "upgrade installer",
            Step::InstallManifest => "install manifest",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for venvstamp operations
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The manifest the rule depends on does not exist
    #[error("manifest not found: {path}")]
    ManifestMissing { path: PathBuf },

    /// An input of a build rule is neither on disk nor produced by another rule
    #[error("input '{input}' of '{output}' does not exist and no rule produces it")]
    MissingInput { input: PathBuf, output: PathBuf },

    /// No rule produces the requested artifact
    #[error("no rule produces '{path}'")]
    UnknownArtifact { path: PathBuf },

    /// Two rules claim the same output
    #[error("more than one rule produces '{path}'")]
    DuplicateRule { path: PathBuf },

    /// Rules depend on each other in a loop
    #[error("dependency cycle through '{path}'")]
    Cycle { path: PathBuf },

    /// `env_dir` exists but does not hold a virtual environment
    #[error(
        "'{path}' exists but is not a virtual environment (no pyvenv.cfg); \
         remove it or set environment.on_invalid = \"recreate\""
    )]
    InvalidEnvironment { path: PathBuf },

    /// A delegated tool could not be started at all
    #[error("{step}: failed to run '{program}': {source}")]
    Spawn {
        step: Step,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A delegated tool ran and exited unsuccessfully
    #[error("{step} failed ({status}): {command}")]
    StepFailed {
        step: Step,
        command: String,
        status: ExitStatus,
    },

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Filesystem operation on a known path failed
    #[error("failed to {action} '{path}': {source}")]
    File {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// The provisioning step that failed, if the error came from one
    pub fn step(&self) -> Option<Step> {
        match self {
            ProvisionError::Spawn { step, .. } | ProvisionError::StepFailed { step, .. } => {
                Some(*step)
            }
            _ => None,
        }
    }

    /// `map_err` adapter that attaches the path being worked on
    pub fn file<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> Self + 'a {
        move |source| ProvisionError::File {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}
