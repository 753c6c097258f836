//! Test matrix driver.
//!
//! One case walks CLEAN → INVOKE → CAPTURE → NORMALIZE → COMPARE and ends
//! in PASS or FAIL. Cases run single-threaded and synchronously; the only
//! shared state is the scratch cache directory, which is wiped before
//! every case so nothing leaks across cases. The driver aborts the whole
//! run before any comparison if a real target has no oracle entry — drift
//! between templates and tables must fail fast with the target's name, not
//! surface as a confusing sequence mismatch.

pub mod engine;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use mkcheck_normalize::{normalize, strip_ansi};
use mkcheck_oracle::{Oracle, OracleError, TargetTable};
use mkcheck_utils::{EnvOverrides, HarnessContext};

pub use engine::{Capture, EngineSpec, baseline_env, invoke};

/// Target whose executed output is the self-documentation listing. Its
/// dry-run capture is asserted non-empty instead of byte-compared; the
/// listing is color- and padding-sensitive and the oracle does not try to
/// reproduce it for every permutation.
pub const HELP_TARGET: &str = "help";

/// Run-level failure: aborts the matrix (or a case) with a harness error
/// rather than a test failure.
#[derive(Error, Debug)]
pub enum MatrixError {
    /// A real target exists with no oracle entry.
    #[error("configuration drift: no expected execution path defined for target \"{target}\"")]
    Drift { target: String },

    /// The engine process could not be started.
    #[error("failed to spawn engine \"{program}\": {reason}")]
    EngineSpawn { program: String, reason: String },

    /// Target discovery ran the engine and it failed.
    #[error("target discovery failed (exit {exit_code:?}): {stderr}")]
    Discovery { exit_code: Option<i32>, stderr: String },

    /// The self-documentation output had no rows to discover targets from.
    #[error("target discovery produced no rows")]
    EmptyHelp,

    /// A discovered help row had no target/description separator.
    #[error("malformed help row: \"{line}\"")]
    HelpParse { line: String },

    /// The scratch cache directory could not be removed.
    #[error("failed to clean scratch dir {path}: {reason}")]
    Scratch { path: String, reason: String },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Outcome of one (target, permutation) case.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum CaseOutcome {
    Pass,
    /// Normalized capture differs from the prediction; both sequences are
    /// attached for diffing. This is the expected "test failed" path.
    Mismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    /// The engine exited non-zero for this case.
    EngineFailure {
        exit_code: Option<i32>,
        stderr: String,
    },
    /// The normalizer refused the capture; fatal for this case only.
    NormalizeFailure { message: String },
}

impl CaseOutcome {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Report row for one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub target: String,
    pub permutation: String,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
}

/// Full matrix run report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatrixReport {
    pub cases: Vec<CaseReport>,
}

impl MatrixReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.is_pass()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Matrix driver over one target table.
#[derive(Debug)]
pub struct MatrixDriver<'a> {
    ctx: &'a HarnessContext,
    engine: EngineSpec,
    table: &'a TargetTable,
}

impl<'a> MatrixDriver<'a> {
    #[must_use]
    pub fn new(ctx: &'a HarnessContext, engine: EngineSpec, table: &'a TargetTable) -> Self {
        Self { ctx, engine, table }
    }

    /// Run the full matrix: discover targets once from the default
    /// permutation's self-documentation output, gate on the drift
    /// invariant, then compare every (permutation, target) case.
    ///
    /// # Errors
    ///
    /// Harness errors only — drift, discovery failure, broken table. Case
    /// failures (mismatch, engine non-zero, normalization refusal) are
    /// reported in the returned [`MatrixReport`].
    pub fn run(&self) -> Result<MatrixReport, MatrixError> {
        let oracle = Oracle::new(self.table);
        let discovered = self.discover_targets()?;

        for target in &discovered {
            if !oracle.covers(target) {
                return Err(MatrixError::Drift { target: target.clone() });
            }
        }

        let mut report = MatrixReport::default();
        for env in self.table.permutations() {
            // Building the full mapping up front also re-checks the
            // help-coverage invariant for this permutation.
            let expected = oracle.expected_paths(self.ctx, &env)?;
            for (target, expected_path) in expected {
                debug!(case = %target, permutation = %env.label(), "running case");
                let outcome = self.run_case(&target, &expected_path, &env)?;
                report.cases.push(CaseReport {
                    target,
                    permutation: env.label(),
                    outcome,
                });
            }
        }

        info!(passed = report.passed(), failed = report.failed(), "matrix finished");
        Ok(report)
    }

    /// One CLEAN → INVOKE → CAPTURE → NORMALIZE → COMPARE pass.
    fn run_case(
        &self,
        target: &str,
        expected: &[String],
        env: &EnvOverrides,
    ) -> Result<CaseOutcome, MatrixError> {
        self.clean_scratch()?;

        let capture = invoke(
            self.ctx,
            &self.engine,
            &self.table.makefile,
            Some(target),
            true,
            env,
        )?;
        if !capture.success() {
            return Ok(CaseOutcome::EngineFailure {
                exit_code: capture.exit_code,
                stderr: capture.stderr,
            });
        }

        let normalized = match normalize(self.ctx, &capture.stdout) {
            Ok(text) => text,
            Err(e) => return Ok(CaseOutcome::NormalizeFailure { message: e.to_string() }),
        };
        let actual: Vec<String> = normalized
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();

        if target == HELP_TARGET {
            // Documentation output is only asserted non-empty.
            if actual.is_empty() {
                return Ok(CaseOutcome::Mismatch {
                    expected: expected.to_vec(),
                    actual,
                });
            }
            return Ok(CaseOutcome::Pass);
        }

        if actual == expected {
            Ok(CaseOutcome::Pass)
        } else {
            Ok(CaseOutcome::Mismatch {
                expected: expected.to_vec(),
                actual,
            })
        }
    }

    /// Run the self-documentation target for real and parse the advertised
    /// target names from its listing.
    fn discover_targets(&self) -> Result<Vec<String>, MatrixError> {
        self.clean_scratch()?;
        let capture = invoke(
            self.ctx,
            &self.engine,
            &self.table.makefile,
            Some(HELP_TARGET),
            false,
            &EnvOverrides::new(),
        )?;
        if !capture.success() {
            return Err(MatrixError::Discovery {
                exit_code: capture.exit_code,
                stderr: capture.stderr,
            });
        }

        let listing = strip_ansi(&capture.stdout);
        let rows: Vec<&str> = listing
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(MatrixError::EmptyHelp);
        }

        let mut targets = Vec::with_capacity(rows.len());
        for row in rows {
            let index = row
                .find(' ')
                .ok_or_else(|| MatrixError::HelpParse { line: row.to_owned() })?;
            targets.push(row[..index].to_owned());
        }
        Ok(targets)
    }

    /// Remove the scratch cache directory; absence is fine.
    fn clean_scratch(&self) -> Result<(), MatrixError> {
        let path = self.ctx.root.join(&self.table.scratch_dir);
        match std::fs::remove_dir_all(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MatrixError::Scratch {
                path: path.into_string(),
                reason: e.to_string(),
            }),
        }
    }
}
