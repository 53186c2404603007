//! Test environment builder for isolated venvstamp testing.
//!
//! Provides `TestEnv` - a temp project directory, a fake interpreter that
//! records every call, and helpers to run the venvstamp binary in it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::SystemTime;

use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;

use super::fixtures::{FAKE_PYTHON, REQUIREMENTS};

/// Result of running a venvstamp CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Check if command succeeded
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated project with a fake `python3`
pub struct TestEnv {
    pub project_root: TempDir,
    /// Holds the fake interpreter, its call log, and an empty user config dir
    tools_dir: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    /// Project with the default `requirements.txt` written
    pub fn new() -> Self {
        let env = Self::empty();
        env.write_project_file("requirements.txt", REQUIREMENTS);
        env
    }

    /// Project with nothing in it
    pub fn empty() -> Self {
        let project_root = tempfile::tempdir().expect("Failed to create project dir");
        let tools_dir = tempfile::tempdir().expect("Failed to create tools dir");

        let python = tools_dir.path().join("python3");
        fs::write(&python, FAKE_PYTHON).expect("Failed to write fake python");
        make_executable(&python);

        Self {
            project_root,
            tools_dir,
            bin: PathBuf::from(env!("CARGO_BIN_EXE_venvstamp")),
        }
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    pub fn fake_python(&self) -> PathBuf {
        self.tools_dir.path().join("python3")
    }

    fn call_log(&self) -> PathBuf {
        self.tools_dir.path().join("calls.log")
    }

    /// Run venvstamp from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run venvstamp from the project root with extra env vars
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env_remove("RUST_LOG")
            .env_remove("VENVSTAMP_ON_INVALID_ENV")
            .env_remove("FAKE_PYTHON_FAIL_INSTALL")
            .env("VENVSTAMP_PYTHON", self.fake_python())
            .env(
                "VENVSTAMP_USER_CONFIG_PATH",
                self.tools_dir.path().join("no-user-config.toml"),
            )
            .env("FAKE_PYTHON_LOG", self.call_log());

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute venvstamp");
        output_to_result(output)
    }

    /// Arguments of every fake interpreter call so far, oldest first
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.call_log())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        let _ = fs::remove_file(self.call_log());
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative_path: &str, content: &str) {
        let full_path = self.project_path(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directories");
        }
        fs::write(&full_path, content).expect("Failed to write file");
    }

    /// Set a project file's mtime to `secs` after the epoch
    pub fn set_mtime(&self, relative_path: &str, secs: i64) {
        set_file_mtime(
            self.project_path(relative_path),
            FileTime::from_unix_time(secs, 0),
        )
        .expect("Failed to set mtime");
    }

    pub fn mtime(&self, relative_path: &str) -> SystemTime {
        fs::metadata(self.project_path(relative_path))
            .and_then(|m| m.modified())
            .expect("Failed to read mtime")
    }

    /// Make the sentinel older than the manifest, as after an edit
    pub fn age_sentinel(&self, sentinel: &str, manifest: &str) {
        self.set_mtime(sentinel, 1_000_000);
        self.set_mtime(manifest, 2_000_000);
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod fake python");
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
