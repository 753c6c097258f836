//! mkcheck - execution-path verification harness for build templates
//!
//! mkcheck verifies that `make`-style build-orchestration templates emit
//! exactly the shell commands they are expected to, across platforms and
//! environment permutations. It never runs the orchestrated tools: the
//! engine is invoked in dry-run mode, its output is normalized (absolute
//! paths become `$ROOT`/`$HOME`/`$PLATFORM` tokens, ANSI styling is
//! stripped, separators are folded) and compared byte-for-byte against a
//! prediction synthesized from a declarative per-project target table.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Run the full verification matrix for a project table
//! mkcheck matrix --table tables/php-library.toml
//!
//! # Print the predicted command sequence for one target
//! mkcheck predict --table tables/php-library.toml --target test
//!
//! # Normalize captured output on stdin
//! make -f resources/PHP/library.mk --dry-run test | mkcheck normalize
//! ```
//!
//! # Library layout
//!
//! - [`HarnessContext`] — immutable per-run machine facts, captured once
//! - [`normalize`] — capture normalization
//! - [`synth`] — per-action command synthesizers
//! - [`Oracle`] / [`TargetTable`] — expected-path composition over a
//!   declarative table
//! - [`MatrixDriver`] — permutation × target enumeration and comparison

pub mod cli;

pub use mkcheck_matrix::{
    CaseOutcome, CaseReport, EngineSpec, HELP_TARGET, MatrixDriver, MatrixError, MatrixReport,
};
pub use mkcheck_normalize::{NormalizeError, normalize, strip_ansi};
pub use mkcheck_oracle::{Oracle, OracleError, PathRule, TargetTable};
pub use mkcheck_synth as synth;
pub use mkcheck_utils::{EnvOverrides, ExitCode, HarnessContext, Identity, Platform};
