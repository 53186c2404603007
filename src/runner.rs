//! External command execution
//!
//! Every provisioning step is a single external command. Its output goes
//! straight to the invoking terminal; only the exit status is inspected.

use std::ffi::{OsStr, OsString};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{ProvisionError, ProvisionResult, Step};

/// A command line tagged with the step it implements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    pub step: Step,
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl StepCommand {
    pub fn new(step: Step, program: impl AsRef<OsStr>) -> Self {
        Self {
            step,
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Command line for diagnostics
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs step commands to completion
pub trait CommandRunner {
    fn run(&self, command: &StepCommand) -> ProvisionResult<()>;
}

/// Runs commands as child processes with inherited stdout/stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &StepCommand) -> ProvisionResult<()> {
        debug!("running: {}", command.display());

        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ProvisionError::Spawn {
                step: command.step,
                program: command.program.to_string_lossy().into_owned(),
                source,
            })?;

        if !status.success() {
            return Err(ProvisionError::StepFailed {
                step: command.step,
                command: command.display(),
                status,
            });
        }
        Ok(())
    }
}

/// Runner double that records commands instead of running them.
///
/// Creating an environment writes the `pyvenv.cfg` marker so later runs see
/// a valid environment, and any step can be made to fail.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub commands: std::cell::RefCell<Vec<StepCommand>>,
    pub fail_on: Option<Step>,
}

#[cfg(test)]
impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(step: Step) -> Self {
        Self {
            fail_on: Some(step),
            ..Self::default()
        }
    }

    pub fn steps(&self) -> Vec<Step> {
        self.commands.borrow().iter().map(|c| c.step).collect()
    }

    pub fn clear(&self) {
        self.commands.borrow_mut().clear();
    }
}

#[cfg(test)]
impl CommandRunner for RecordingRunner {
    fn run(&self, command: &StepCommand) -> ProvisionResult<()> {
        self.commands.borrow_mut().push(command.clone());

        if self.fail_on == Some(command.step) {
            return Err(ProvisionError::StepFailed {
                step: command.step,
                command: command.display(),
                status: failed_status(),
            });
        }

        if command.step == Step::CreateEnvironment {
            // `<python> -m venv <dir>`
            if let Some(dir) = command.args.last() {
                let dir = std::path::Path::new(dir);
                std::fs::create_dir_all(dir)?;
                std::fs::write(dir.join(crate::environment::MARKER), "")?;
            }
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
fn failed_status() -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(1 << 8)
}

#[cfg(all(test, windows))]
fn failed_status() -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let cmd = StepCommand::new(Step::InstallManifest, "/env/bin/python")
            .args(["-m", "pip", "install"])
            .arg("-r")
            .arg("requirements.txt");
        assert_eq!(
            cmd.display(),
            "/env/bin/python -m pip install -r requirements.txt"
        );
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let cmd = StepCommand::new(
            Step::CreateEnvironment,
            "venvstamp-definitely-not-a-real-program",
        );
        let err = SystemRunner.run(&cmd).unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Spawn {
                step: Step::CreateEnvironment,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_step_failure() {
        let cmd = StepCommand::new(Step::UpgradeBootstrap, "sh").args(["-c", "exit 3"]);
        let err = SystemRunner.run(&cmd).unwrap_err();
        match err {
            ProvisionError::StepFailed { step, status, .. } => {
                assert_eq!(step, Step::UpgradeBootstrap);
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_is_success() {
        let cmd = StepCommand::new(Step::InstallManifest, "true");
        SystemRunner.run(&cmd).unwrap();
    }
}
