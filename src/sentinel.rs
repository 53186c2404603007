//! Sentinel files
//!
//! A sentinel carries no content; its modification time records the last
//! successful build of whatever it stands for.

use std::fs::{self, OpenOptions};
use std::path::Path;

use filetime::{set_file_mtime, FileTime};
use tracing::debug;

use crate::error::{ProvisionError, ProvisionResult};

/// Set `path`'s modification time to now, creating an empty file (and its
/// parent directories) if it does not exist. Existing content is kept.
pub fn touch(path: &Path) -> ProvisionResult<()> {
    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(ProvisionError::file("create", parent))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(ProvisionError::file("create", path))?;
        debug!("created {}", path.display());
    }
    set_file_mtime(path, FileTime::now()).map_err(ProvisionError::file("touch", path))?;
    Ok(())
}

/// Delete the sentinel. Returns whether there was one to delete.
pub fn remove(path: &Path) -> ProvisionResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ProvisionError::file("remove", path)(e)),
    }
}
