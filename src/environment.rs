//! Virtual environment directory
//!
//! The layout below `env_dir` belongs to `venv`. Only two things are relied
//! on: the `pyvenv.cfg` marker that every virtual environment carries, and
//! the location of the environment's interpreter.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, ProvisionResult};

/// File `venv` writes at the root of every environment
pub const MARKER: &str = "pyvenv.cfg";

/// What is currently at `env_dir`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    /// Nothing at the path
    Absent,
    /// A directory holding the environment marker
    Valid,
    /// Something is there, but it is not an environment
    Invalid,
}

impl EnvState {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvState::Absent => "absent",
            EnvState::Valid => "valid",
            EnvState::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    dir: PathBuf,
}

impl Environment {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn marker(&self) -> PathBuf {
        self.dir.join(MARKER)
    }

    pub fn state(&self) -> EnvState {
        if self.marker().is_file() {
            EnvState::Valid
        } else if self.dir.symlink_metadata().is_ok() {
            EnvState::Invalid
        } else {
            EnvState::Absent
        }
    }

    /// Interpreter inside the environment
    pub fn python(&self) -> PathBuf {
        if cfg!(windows) {
            self.dir.join("Scripts").join("python.exe")
        } else {
            self.dir.join("bin").join("python")
        }
    }

    /// Delete whatever is at `env_dir`. Returns whether anything was there.
    pub fn remove(&self) -> ProvisionResult<bool> {
        let meta = match self.dir.symlink_metadata() {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(ProvisionError::file("inspect", &self.dir)(e)),
        };
        let removed = if meta.is_dir() {
            fs::remove_dir_all(&self.dir)
        } else {
            fs::remove_file(&self.dir)
        };
        removed.map_err(ProvisionError::file("remove", &self.dir))?;
        Ok(true)
    }
}
