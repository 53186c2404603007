//! Incremental provisioner
//!
//! One build rule: the sentinel depends on the manifest. When the sentinel is
//! missing or older than the manifest, the environment is created if needed,
//! the installer packages are upgraded, and the manifest is installed, in that
//! order. The sentinel is touched only after all three succeed, so any failure
//! leaves it stale and the next run starts over from the first step.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{Config, InvalidEnvPolicy};
use crate::environment::{EnvState, Environment};
use crate::error::{ProvisionError, ProvisionResult, Step};
use crate::graph::{BuildGraph, Producer, Rule, Staleness};
use crate::runner::{CommandRunner, StepCommand};
use crate::sentinel;

/// The three paths the rule works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub manifest: PathBuf,
    pub sentinel: PathBuf,
    pub env_dir: PathBuf,
}

impl Layout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            manifest: config.paths.manifest.clone(),
            sentinel: config.paths.sentinel.clone(),
            env_dir: config.paths.env_dir.clone(),
        }
    }
}

/// Result of a successful `ensure`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Sentinel was newer than the manifest; nothing ran
    UpToDate,
    /// All steps ran and the sentinel was advanced
    Provisioned { created_env: bool },
}

/// Snapshot for `status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub staleness: Staleness,
    pub env: EnvState,
}

/// What `clean` removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub removed_sentinel: bool,
    pub removed_env: bool,
}

pub struct Provisioner<'r, R: CommandRunner + ?Sized> {
    layout: Layout,
    config: Config,
    runner: &'r R,
}

impl<'r, R: CommandRunner + ?Sized> Provisioner<'r, R> {
    pub fn new(config: Config, runner: &'r R) -> Self {
        Self {
            layout: Layout::from_config(&config),
            config,
            runner,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn environment(&self) -> Environment {
        Environment::new(&self.layout.env_dir)
    }

    fn require_manifest(&self) -> ProvisionResult<()> {
        if !self.layout.manifest.is_file() {
            return Err(ProvisionError::ManifestMissing {
                path: self.layout.manifest.clone(),
            });
        }
        Ok(())
    }

    fn graph(&self) -> ProvisionResult<BuildGraph<'_>> {
        let mut graph = BuildGraph::new();
        graph.add_rule(
            Rule::new(&self.layout.sentinel, ProvisionSteps { owner: self })
                .input(&self.layout.manifest),
        )?;
        Ok(graph)
    }

    /// Provision the environment if the manifest changed since the last
    /// successful run.
    pub fn ensure(&self) -> ProvisionResult<Outcome> {
        self.require_manifest()?;

        let had_env = self.environment().state() == EnvState::Valid;
        let report = self.graph()?.build(&self.layout.sentinel)?;

        if report.was_built(&self.layout.sentinel) {
            info!(
                "provisioned {}, marked {}",
                self.layout.env_dir.display(),
                self.layout.sentinel.display()
            );
            Ok(Outcome::Provisioned {
                created_env: !had_env,
            })
        } else {
            debug!(
                "{} is newer than {}, nothing to do",
                self.layout.sentinel.display(),
                self.layout.manifest.display()
            );
            Ok(Outcome::UpToDate)
        }
    }

    /// Report staleness without running anything
    pub fn status(&self) -> ProvisionResult<Status> {
        self.require_manifest()?;
        Ok(Status {
            staleness: self.graph()?.status(&self.layout.sentinel)?,
            env: self.environment().state(),
        })
    }

    /// Delete the sentinel so the next `ensure` rebuilds; optionally delete
    /// the environment too.
    pub fn clean(&self, remove_env: bool) -> ProvisionResult<CleanReport> {
        let removed_sentinel = sentinel::remove(&self.layout.sentinel)?;
        let removed_env = if remove_env {
            self.environment().remove()?
        } else {
            false
        };
        Ok(CleanReport {
            removed_sentinel,
            removed_env,
        })
    }

    fn create_command(&self) -> StepCommand {
        StepCommand::new(Step::CreateEnvironment, &self.config.python.interpreter)
            .args(["-m", "venv"])
            .arg(&self.layout.env_dir)
    }

    fn bootstrap_command(&self, env: &Environment) -> StepCommand {
        StepCommand::new(Step::UpgradeBootstrap, env.python())
            .args(["-m", "pip", "install", "--upgrade"])
            .args(self.config.bootstrap.requirements())
    }

    fn install_command(&self, env: &Environment) -> StepCommand {
        let cmd = StepCommand::new(Step::InstallManifest, env.python())
            .args(["-m", "pip", "install"]);
        let cmd = if self.config.install.upgrade {
            cmd.arg("--upgrade")
        } else {
            cmd
        };
        cmd.arg("-r").arg(&self.layout.manifest)
    }

    fn prepare_environment(&self, env: &Environment) -> ProvisionResult<()> {
        match env.state() {
            EnvState::Valid => {
                debug!("environment {} already exists", env.dir().display());
                return Ok(());
            }
            EnvState::Absent => {}
            EnvState::Invalid => match self.config.environment.on_invalid {
                InvalidEnvPolicy::Fail => {
                    return Err(ProvisionError::InvalidEnvironment {
                        path: env.dir().to_path_buf(),
                    });
                }
                InvalidEnvPolicy::Recreate => {
                    warn!(
                        "{} is not a virtual environment, recreating it",
                        env.dir().display()
                    );
                    env.remove()?;
                }
            },
        }

        info!("creating environment {}", env.dir().display());
        self.runner.run(&self.create_command())
    }

    fn run_steps(&self) -> ProvisionResult<()> {
        let env = self.environment();
        self.prepare_environment(&env)?;

        if self.config.bootstrap.is_empty() {
            debug!("no bootstrap packages configured, skipping installer upgrade");
        } else {
            info!("upgrading {}", self.config.bootstrap.requirements().join(", "));
            self.runner.run(&self.bootstrap_command(&env))?;
        }

        info!("installing {}", self.layout.manifest.display());
        self.runner.run(&self.install_command(&env))
    }
}

/// The provisioning sequence as a graph producer
struct ProvisionSteps<'p, 'r, R: CommandRunner + ?Sized> {
    owner: &'p Provisioner<'r, R>,
}

impl<R: CommandRunner + ?Sized> Producer for ProvisionSteps<'_, '_, R> {
    fn describe(&self) -> String {
        format!(
            "provision {} from {}",
            self.owner.layout.env_dir.display(),
            self.owner.layout.manifest.display()
        )
    }

    fn produce(&self) -> ProvisionResult<()> {
        self.owner.run_steps()
    }
}

/// Convenience wrapper for callers that only have the three paths
pub fn ensure<R: CommandRunner + ?Sized>(
    manifest: &Path,
    sentinel: &Path,
    env_dir: &Path,
    runner: &R,
) -> ProvisionResult<Outcome> {
    let mut config = Config::default();
    config.paths.manifest = manifest.to_path_buf();
    config.paths.sentinel = sentinel.to_path_buf();
    config.paths.env_dir = env_dir.to_path_buf();
    Provisioner::new(config, runner).ensure()
}
