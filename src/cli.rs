//! Command-line interface for mkcheck.
//!
//! Three commands over the same library: `matrix` runs the full
//! verification matrix for a target table, `predict` prints the oracle's
//! expected command sequences, and `normalize` filters captured output on
//! stdin. Library errors never exit the process; only this module maps
//! them to exit codes.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use mkcheck_matrix::{CaseOutcome, EngineSpec, MatrixDriver, MatrixError};
use mkcheck_oracle::{Oracle, TargetTable};
use mkcheck_utils::{EnvOverrides, ExitCode, HarnessContext, logging};

/// mkcheck - execution-path verification for build templates
#[derive(Parser)]
#[command(name = "mkcheck")]
#[command(about = "Verify the exact shell commands build templates emit under dry-run")]
#[command(version)]
pub struct Cli {
    /// Build root holding the templates under test (defaults to the
    /// current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full verification matrix for a target table
    Matrix {
        /// Target table (TOML)
        #[arg(long)]
        table: PathBuf,

        /// Engine binary to invoke (defaults to `make`)
        #[arg(long)]
        engine: Option<String>,

        /// Emit the report as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },

    /// Print the oracle's expected command sequences
    Predict {
        /// Target table (TOML)
        #[arg(long)]
        table: PathBuf,

        /// Single target to predict (defaults to all mapped targets)
        #[arg(long)]
        target: Option<String>,

        /// Environment overrides for the permutation, as NAME=VALUE
        #[arg(long = "env", value_name = "NAME=VALUE")]
        env: Vec<String>,
    },

    /// Normalize captured engine output from stdin to stdout
    Normalize {
        /// Home path to fold to $HOME (defaults to the synthetic home the
        /// matrix exports)
        #[arg(long)]
        home: Option<PathBuf>,
    },
}

/// Parse arguments, dispatch, and map failures to exit codes.
///
/// # Errors
///
/// Returns the exit code the process should terminate with; all diagnostic
/// output has already been printed.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    // A second init (e.g. under tests) is harmless.
    let _ = logging::init_tracing(cli.verbose);

    let ctx = match build_context(cli.root.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Err(ExitCode::CliArgs);
        }
    };

    match cli.command {
        Command::Matrix { table, engine, json } => run_matrix(&ctx, &table, engine, json),
        Command::Predict { table, target, env } => run_predict(&ctx, &table, target.as_deref(), &env),
        Command::Normalize { home } => run_normalize(ctx, home.as_deref()),
    }
}

fn build_context(root: Option<&std::path::Path>) -> Result<HarnessContext> {
    let root = match root {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("cannot resolve build root {}", root.display()))?;
    let root = Utf8PathBuf::from_path_buf(root)
        .map_err(|p| anyhow::anyhow!("build root is not valid UTF-8: {}", p.display()))?;
    Ok(HarnessContext::capture(root))
}

fn load_table(path: &std::path::Path) -> Result<TargetTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read target table {}", path.display()))?;
    let table = TargetTable::from_toml_str(&text)
        .with_context(|| format!("cannot parse target table {}", path.display()))?;
    Ok(table)
}

fn run_matrix(
    ctx: &HarnessContext,
    table_path: &std::path::Path,
    engine: Option<String>,
    json: bool,
) -> Result<(), ExitCode> {
    let table = match load_table(table_path) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Err(ExitCode::CliArgs);
        }
    };

    let engine = engine.map_or_else(EngineSpec::default, EngineSpec::new);
    let driver = MatrixDriver::new(ctx, engine, &table);
    let report = match driver.run() {
        Ok(report) => report,
        Err(e @ (MatrixError::EngineSpawn { .. } | MatrixError::Discovery { .. })) => {
            eprintln!("error: {e}");
            return Err(ExitCode::EngineFailure);
        }
        Err(e) => {
            eprintln!("error: {e}");
            return Err(ExitCode::VerificationFailed);
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: cannot serialize report: {e}");
                return Err(ExitCode::CliArgs);
            }
        }
    } else {
        print_report_text(&report);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(ExitCode::VerificationFailed)
    }
}

fn print_report_text(report: &mkcheck_matrix::MatrixReport) {
    for case in &report.cases {
        match &case.outcome {
            CaseOutcome::Pass => {}
            CaseOutcome::Mismatch { expected, actual } => {
                println!("FAIL {} [{}]", case.target, case.permutation);
                println!("  expected:");
                for line in expected {
                    println!("    {line}");
                }
                println!("  actual:");
                for line in actual {
                    println!("    {line}");
                }
            }
            CaseOutcome::EngineFailure { exit_code, stderr } => {
                println!("FAIL {} [{}]: engine exited {exit_code:?}", case.target, case.permutation);
                for line in stderr.lines() {
                    println!("    {line}");
                }
            }
            CaseOutcome::NormalizeFailure { message } => {
                println!("FAIL {} [{}]: {message}", case.target, case.permutation);
            }
        }
    }
    println!("{} passed, {} failed", report.passed(), report.failed());
}

fn run_predict(
    ctx: &HarnessContext,
    table_path: &std::path::Path,
    target: Option<&str>,
    env_pairs: &[String],
) -> Result<(), ExitCode> {
    let table = match load_table(table_path) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Err(ExitCode::CliArgs);
        }
    };

    let mut env = EnvOverrides::new();
    for pair in env_pairs {
        match pair.split_once('=') {
            Some((name, value)) => {
                env.set(name, value);
            }
            None => {
                eprintln!("error: invalid --env value \"{pair}\", expected NAME=VALUE");
                return Err(ExitCode::CliArgs);
            }
        }
    }

    let oracle = Oracle::new(&table);
    let result = match target {
        Some(target) => oracle
            .expected_for(ctx, &env, target)
            .map(|path| vec![(target.to_owned(), path)]),
        None => oracle
            .expected_paths(ctx, &env)
            .map(|paths| paths.into_iter().collect()),
    };

    match result {
        Ok(predictions) => {
            for (target, path) in predictions {
                println!("{target}:");
                for line in path {
                    println!("  {line}");
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err(ExitCode::VerificationFailed)
        }
    }
}

fn run_normalize(mut ctx: HarnessContext, home: Option<&std::path::Path>) -> Result<(), ExitCode> {
    if let Some(home) = home {
        match Utf8PathBuf::from_path_buf(home.to_path_buf()) {
            Ok(home) => ctx.home = home,
            Err(p) => {
                eprintln!("error: home path is not valid UTF-8: {}", p.display());
                return Err(ExitCode::CliArgs);
            }
        }
    }

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("error: cannot read stdin: {e}");
        return Err(ExitCode::CliArgs);
    }

    match mkcheck_normalize::normalize(&ctx, &input) {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err(ExitCode::VerificationFailed)
        }
    }
}
