//! Timestamp-driven build graph
//!
//! A graph is a set of rules, each an `(output, producer, inputs)` triple.
//! Building an output first builds any input that is itself the output of
//! another rule, then runs the rule's producer only if the output is stale,
//! and finally touches the output. The touch is the commit point: a producer
//! failure leaves the output's timestamp where it was.
//!
//! Builds are sequential and depth-first.

pub mod staleness;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ProvisionError, ProvisionResult};
use crate::sentinel;

pub use staleness::Staleness;

/// Something that brings a rule's output up to date
pub trait Producer {
    /// Human-readable description used in logs
    fn describe(&self) -> String;

    /// Run the work. The graph touches the output afterwards.
    fn produce(&self) -> ProvisionResult<()>;
}

/// One edge set of the graph: `output` depends on `inputs`
pub struct Rule<'a> {
    output: PathBuf,
    inputs: Vec<PathBuf>,
    producer: Box<dyn Producer + 'a>,
}

impl<'a> Rule<'a> {
    pub fn new(output: impl Into<PathBuf>, producer: impl Producer + 'a) -> Self {
        Self {
            output: output.into(),
            inputs: Vec::new(),
            producer: Box::new(producer),
        }
    }

    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.inputs.push(input.into());
        self
    }
}

/// What a build did to each rule it visited, in visit order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub built: Vec<PathBuf>,
    pub fresh: Vec<PathBuf>,
}

impl BuildReport {
    pub fn was_built(&self, output: &Path) -> bool {
        self.built.iter().any(|p| p == output)
    }
}

/// Rules indexed by output path
#[derive(Default)]
pub struct BuildGraph<'a> {
    rules: Vec<Rule<'a>>,
    by_output: HashMap<PathBuf, usize>,
}

impl<'a> BuildGraph<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. Each output may have only one producer.
    pub fn add_rule(&mut self, rule: Rule<'a>) -> ProvisionResult<()> {
        if self.by_output.contains_key(&rule.output) {
            return Err(ProvisionError::DuplicateRule { path: rule.output });
        }
        self.by_output.insert(rule.output.clone(), self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn rule_for(&self, output: &Path) -> ProvisionResult<&Rule<'a>> {
        self.by_output
            .get(output)
            .map(|&idx| &self.rules[idx])
            .ok_or_else(|| ProvisionError::UnknownArtifact {
                path: output.to_path_buf(),
            })
    }

    /// Report whether `target` would be rebuilt, without side effects.
    pub fn status(&self, target: &Path) -> ProvisionResult<Staleness> {
        let mut visiting = HashSet::new();
        self.status_inner(target, &mut visiting)
    }

    fn status_inner(
        &self,
        target: &Path,
        visiting: &mut HashSet<PathBuf>,
    ) -> ProvisionResult<Staleness> {
        let rule = self.rule_for(target)?;
        if !visiting.insert(target.to_path_buf()) {
            return Err(ProvisionError::Cycle {
                path: target.to_path_buf(),
            });
        }

        for input in &rule.inputs {
            if self.by_output.contains_key(input)
                && self.status_inner(input, visiting)?.is_stale()
            {
                visiting.remove(target);
                return Ok(Staleness::InputStale {
                    input: input.clone(),
                });
            }
        }
        visiting.remove(target);

        // An upstream output that is fresh still exists, so a missing input
        // here can only be a plain source file.
        staleness::check(&rule.output, &rule.inputs)
    }

    /// Bring `target` up to date, building upstream rules first.
    pub fn build(&self, target: &Path) -> ProvisionResult<BuildReport> {
        let mut report = BuildReport::default();
        let mut visiting = HashSet::new();
        let mut done = HashSet::new();
        self.build_inner(target, &mut visiting, &mut done, &mut report)?;
        Ok(report)
    }

    fn build_inner(
        &self,
        target: &Path,
        visiting: &mut HashSet<PathBuf>,
        done: &mut HashSet<PathBuf>,
        report: &mut BuildReport,
    ) -> ProvisionResult<()> {
        if done.contains(target) {
            return Ok(());
        }
        let rule = self.rule_for(target)?;
        if !visiting.insert(target.to_path_buf()) {
            return Err(ProvisionError::Cycle {
                path: target.to_path_buf(),
            });
        }

        for input in &rule.inputs {
            if self.by_output.contains_key(input) {
                self.build_inner(input, visiting, done, report)?;
            }
        }
        visiting.remove(target);

        let state = staleness::check(&rule.output, &rule.inputs)?;
        if state.is_stale() {
            info!(
                "building {} ({}): {}",
                rule.output.display(),
                state,
                rule.producer.describe()
            );
            rule.producer.produce()?;
            sentinel::touch(&rule.output)?;
            report.built.push(rule.output.clone());
        } else {
            debug!("{} is up to date", rule.output.display());
            report.fresh.push(rule.output.clone());
        }

        done.insert(target.to_path_buf());
        Ok(())
    }
}
