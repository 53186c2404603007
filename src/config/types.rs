//! Configuration types

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProvisionResult;

use super::loader;
use super::ConfigWarning;

/// What to do when `env_dir` exists but holds no virtual environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvalidEnvPolicy {
    /// Stop with a diagnostic naming the directory (default)
    #[default]
    Fail,
    /// Delete the directory and create a fresh environment
    Recreate,
}

impl FromStr for InvalidEnvPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(InvalidEnvPolicy::Fail),
            "recreate" => Ok(InvalidEnvPolicy::Recreate),
            other => Err(format!(
                "invalid value '{}' (expected 'fail' or 'recreate')",
                other
            )),
        }
    }
}

/// Paths of the three artifacts the rule works with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default = "default_sentinel")]
    pub sentinel: PathBuf,

    #[serde(default = "default_env_dir")]
    pub env_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            sentinel: default_sentinel(),
            env_dir: default_env_dir(),
        }
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("requirements.txt")
}

fn default_sentinel() -> PathBuf {
    PathBuf::from(".venv/.requirements.stamp")
}

fn default_env_dir() -> PathBuf {
    PathBuf::from(".venv")
}

/// Interpreter used to create the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PythonConfig {
    #[serde(default = "default_interpreter")]
    pub interpreter: PathBuf,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
        }
    }
}

fn default_interpreter() -> PathBuf {
    PathBuf::from("python3")
}

/// Installer packages upgraded inside the environment on every rebuild.
///
/// Maps package name to a version requirement. `"latest"` (or an empty
/// string) upgrades to the newest release; a value starting with a
/// comparison operator is used as-is; anything else is pinned with `==`.
///
/// A `[bootstrap]` table replaces the default `pip`/`wheel` set rather than
/// extending it, so list every package that should be upgraded. An empty
/// table skips the upgrade step.
///
/// ```toml
/// [bootstrap]
/// pip = "latest"
/// wheel = ">=0.43"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BootstrapConfig {
    pub packages: BTreeMap<String, String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        let mut packages = BTreeMap::new();
        packages.insert("pip".to_string(), LATEST.to_string());
        packages.insert("wheel".to_string(), LATEST.to_string());
        Self { packages }
    }
}

const LATEST: &str = "latest";

impl BootstrapConfig {
    /// Requirement specifiers in the form pip accepts on its command line
    pub fn requirements(&self) -> Vec<String> {
        self.packages
            .iter()
            .map(|(name, version)| requirement(name, version))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

fn requirement(name: &str, version: &str) -> String {
    let version = version.trim();
    if version.is_empty() || version.eq_ignore_ascii_case(LATEST) || version == "*" {
        name.to_string()
    } else if version.starts_with(['=', '<', '>', '!', '~']) {
        format!("{}{}", name, version)
    } else {
        format!("{}=={}", name, version)
    }
}

/// Manifest installation options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Pass `--upgrade` so already-present packages move to satisfy the manifest
    #[serde(default = "default_true")]
    pub upgrade: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self { upgrade: true }
    }
}

fn default_true() -> bool {
    true
}

/// Environment directory handling
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub on_invalid: InvalidEnvPolicy,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub python: PythonConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub environment: EnvironmentConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> ProvisionResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> ProvisionResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from an explicit file, project config, user config, or defaults
    pub fn load_layered(
        explicit: Option<&Path>,
        project_root: &Path,
    ) -> ProvisionResult<(Self, Vec<ConfigWarning>)> {
        loader::load_layered(explicit, project_root)
    }

    /// Apply environment variable overrides (VENVSTAMP_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }
}
