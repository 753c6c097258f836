//! Expected execution-path oracle.
//!
//! The oracle composes synthesizer output into a mapping from target name
//! to ordered expected command sequence for one (platform, environment)
//! pair. It is generic over a per-project [`TargetTable`]; nothing here
//! knows about any particular project's targets.

pub mod table;

use std::collections::BTreeMap;

use thiserror::Error;

use mkcheck_normalize::NormalizeError;
use mkcheck_synth as synth;
use mkcheck_utils::{EnvOverrides, HarnessContext};

pub use table::{PathRule, TargetTable};

/// Oracle failure.
///
/// Every variant is fatal for the run: a broken table or an un-mapped real
/// target is configuration drift, not a soft error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// A real target exists with no expected execution path.
    #[error("no expected execution path defined for target \"{target}\"")]
    UnmappedTarget { target: String },

    /// A table target has no help entry; the listing would silently drop it.
    #[error("no help entry for target \"{target}\"")]
    MissingHelpEntry { target: String },

    /// A rule references a fragment the table does not define.
    #[error("unknown fragment \"{name}\"")]
    UnknownFragment { name: String },

    /// Fragment references form a cycle.
    #[error("fragment cycle through \"{name}\"")]
    FragmentCycle { name: String },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Expected-path oracle over one target table.
#[derive(Debug, Clone, Copy)]
pub struct Oracle<'t> {
    table: &'t TargetTable,
}

impl<'t> Oracle<'t> {
    #[must_use]
    pub fn new(table: &'t TargetTable) -> Self {
        Self { table }
    }

    /// The full mapping from target name to expected command sequence for
    /// one (platform, environment) pair.
    ///
    /// # Errors
    ///
    /// Fails on broken fragment references or a missing help entry for any
    /// mapped target.
    pub fn expected_paths(
        &self,
        ctx: &HarnessContext,
        env: &EnvOverrides,
    ) -> Result<BTreeMap<String, Vec<String>>, OracleError> {
        self.check_help_coverage()?;
        let mut paths = BTreeMap::new();
        for (target, rules) in &self.table.targets {
            paths.insert(target.clone(), self.eval_rules(ctx, env, rules, &mut Vec::new())?);
        }
        Ok(paths)
    }

    /// Expected command sequence for a single target.
    ///
    /// # Errors
    ///
    /// [`OracleError::UnmappedTarget`] when the table has no entry for
    /// `target`; the caller reports that as configuration drift.
    pub fn expected_for(
        &self,
        ctx: &HarnessContext,
        env: &EnvOverrides,
        target: &str,
    ) -> Result<Vec<String>, OracleError> {
        let rules = self
            .table
            .targets
            .get(target)
            .ok_or_else(|| OracleError::UnmappedTarget { target: target.to_owned() })?;
        self.eval_rules(ctx, env, rules, &mut Vec::new())
    }

    /// Whether the table maps `target` at all.
    #[must_use]
    pub fn covers(&self, target: &str) -> bool {
        self.table.targets.contains_key(target)
    }

    /// The listing the `help` target itself is expected to print: one row
    /// per mapped target, with its description from the help-entry map.
    ///
    /// # Errors
    ///
    /// [`OracleError::MissingHelpEntry`] if a mapped target has no
    /// description — the invariant that keeps templates and tables from
    /// drifting apart silently.
    pub fn help_listing(&self) -> Result<String, OracleError> {
        self.check_help_coverage()?;
        let entries = self
            .table
            .targets
            .keys()
            .map(|t| (t.as_str(), self.table.help[t].as_str()));
        Ok(synth::help_listing(entries))
    }

    fn check_help_coverage(&self) -> Result<(), OracleError> {
        for target in self.table.targets.keys() {
            if !self.table.help.contains_key(target) {
                return Err(OracleError::MissingHelpEntry { target: target.clone() });
            }
        }
        Ok(())
    }

    fn eval_rules(
        &self,
        ctx: &HarnessContext,
        env: &EnvOverrides,
        rules: &[PathRule],
        stack: &mut Vec<String>,
    ) -> Result<Vec<String>, OracleError> {
        let mut commands = Vec::new();
        for rule in rules {
            match rule {
                PathRule::ToolRun { inner } => {
                    commands.push(synth::php_tool_run(ctx, env, inner));
                }
                PathRule::NodeRun { inner } => {
                    commands.push(synth::node_tool_run(ctx, env, inner));
                }
                PathRule::ComposeUp { subcommand, mode } => {
                    commands.push(synth::compose_up(subcommand, mode_or_default(mode)));
                }
                PathRule::ComposeExec { inner, mode } => {
                    commands.push(synth::compose_up_exec(ctx, inner, mode_or_default(mode)));
                }
                PathRule::RuntimeUp { subcommand } => {
                    commands.push(synth::runtime_up(subcommand));
                }
                PathRule::RuntimeExec { inner } => {
                    commands.push(synth::runtime_up_exec(ctx, inner));
                }
                PathRule::Buildx { mode } => {
                    commands.push(synth::buildx_bake(mode));
                }
                PathRule::Permissions { dirs } => {
                    commands.extend(synth::permission_setup(ctx.platform, dirs));
                }
                PathRule::HelpPipeline => {
                    commands.push(synth::help_pipeline(ctx, &self.table.help_files)?);
                }
                PathRule::Init => {
                    commands.extend(synth::init_lines(&self.table.init_paths));
                }
                PathRule::Literal { line } => {
                    commands.push(line.clone());
                }
                PathRule::Fragment { name } => {
                    if stack.iter().any(|seen| seen == name) {
                        return Err(OracleError::FragmentCycle { name: name.clone() });
                    }
                    let fragment = self
                        .table
                        .fragments
                        .get(name)
                        .ok_or_else(|| OracleError::UnknownFragment { name: name.clone() })?;
                    stack.push(name.clone());
                    commands.extend(self.eval_rules(ctx, env, fragment, stack)?);
                    stack.pop();
                }
            }
        }
        Ok(commands)
    }
}

fn mode_or_default(mode: &Option<String>) -> &str {
    mode.as_deref().unwrap_or(synth::defaults::COMPOSE_MODE)
}
