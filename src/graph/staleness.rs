//! Timestamp staleness predicate
//!
//! An output is stale when it is missing or when any of its inputs was
//! modified after it. Equal timestamps count as fresh.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{ProvisionError, ProvisionResult};

/// Why an output does or does not need rebuilding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Output exists and no input is newer
    Fresh,
    /// Output does not exist yet
    OutputMissing,
    /// `input` was modified after the output
    InputNewer { input: PathBuf },
    /// `input` is itself produced by a rule that is out of date
    InputStale { input: PathBuf },
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }

    /// Short machine-readable tag, used by `status --json`
    pub fn reason(&self) -> &'static str {
        match self {
            Staleness::Fresh => "fresh",
            Staleness::OutputMissing => "output_missing",
            Staleness::InputNewer { .. } => "input_newer",
            Staleness::InputStale { .. } => "input_stale",
        }
    }
}

impl std::fmt::Display for Staleness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Staleness::Fresh => write!(f, "up to date"),
            Staleness::OutputMissing => write!(f, "output does not exist"),
            Staleness::InputNewer { input } => {
                write!(f, "{} changed since last build", input.display())
            }
            Staleness::InputStale { input } => write!(f, "{} is out of date", input.display()),
        }
    }
}

/// Modification time of `path`, or `None` when it does not exist
pub fn modified(path: &Path) -> ProvisionResult<Option<SystemTime>> {
    match std::fs::metadata(path) {
        Ok(meta) => meta
            .modified()
            .map(Some)
            .map_err(ProvisionError::file("read the modification time of", path)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ProvisionError::file("inspect", path)(e)),
    }
}

/// Pure form of the predicate over already-collected timestamps.
///
/// The first input newer than the output is reported.
pub fn decide<'a, I>(output: Option<SystemTime>, inputs: I) -> Staleness
where
    I: IntoIterator<Item = (&'a Path, SystemTime)>,
{
    let Some(output) = output else {
        return Staleness::OutputMissing;
    };
    inputs
        .into_iter()
        .find(|(_, mtime)| *mtime > output)
        .map(|(input, _)| Staleness::InputNewer {
            input: input.to_path_buf(),
        })
        .unwrap_or(Staleness::Fresh)
}

/// Check `output` against `inputs` on disk.
///
/// Every input must exist; a missing input is an error rather than a
/// reason to rebuild, since no rebuild could make it appear.
pub fn check(output: &Path, inputs: &[PathBuf]) -> ProvisionResult<Staleness> {
    let mut stamped = Vec::with_capacity(inputs.len());
    for input in inputs {
        let mtime = modified(input)?.ok_or_else(|| ProvisionError::MissingInput {
            input: input.clone(),
            output: output.to_path_buf(),
        })?;
        stamped.push((input.as_path(), mtime));
    }
    Ok(decide(modified(output)?, stamped))
}
