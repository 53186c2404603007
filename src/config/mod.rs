//! Configuration module for venvstamp
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (VENVSTAMP_*)
//! 3. Explicit `--config` file, else project config (`venvstamp.toml`)
//! 4. User config (`<config dir>/venvstamp/config.toml`)
//! 5. Built-in defaults (lowest priority)
//!
//! Levels 3 and 4 do not merge: the first file found is used whole.

mod loader;
mod types;

pub use loader::{user_config_path, ConfigWarning, PROJECT_CONFIG_FILE};
pub use types::{
    BootstrapConfig, Config, EnvironmentConfig, InstallConfig, InvalidEnvPolicy, PathsConfig,
    PythonConfig,
};
