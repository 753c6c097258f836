//! Orchestration engine invocation.
//!
//! The engine is spawned argv-style only: program plus discrete arguments,
//! never a shell string. The harness waits synchronously and never imposes
//! a timeout; a hung target is a test-infrastructure failure, not a
//! handled case.

use std::process::Command;

use camino::Utf8Path;

use mkcheck_utils::{EnvOverrides, HarnessContext, Platform};

use crate::MatrixError;

/// Which engine binary to invoke.
///
/// Defaults to `make`; tests substitute a stub that replays canned dry-run
/// output.
#[derive(Debug, Clone)]
pub struct EngineSpec {
    pub program: String,
}

impl Default for EngineSpec {
    fn default() -> Self {
        Self { program: "make".to_owned() }
    }
}

impl EngineSpec {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

/// Captured output of one engine invocation.
#[derive(Debug, Clone)]
pub struct Capture {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` if terminated by signal.
    pub exit_code: Option<i32>,
}

impl Capture {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Baseline environment the engine always runs under.
///
/// A synthetic home, the template-root marker, a fixed numeric runner
/// identity, disabled CI markers and the fixed compose-project and
/// kernel-class values make the dry-run output reproducible; permutation
/// overrides are layered on top.
#[must_use]
pub fn baseline_env(ctx: &HarnessContext) -> Vec<(String, String)> {
    [
        ("HOME", ctx.home.as_str().to_owned()),
        ("MKCHECK_ROOT", ctx.root.join("resources").into_string()),
        ("RUNNER", "999".to_owned()),
        ("APP_ENV", "env".to_owned()),
        ("APP_ROOT", ctx.root.as_str().to_owned()),
        ("PHP_VERSION", String::new()),
        ("GITHUB_ACTIONS", String::new()),
        ("COMPOSE_PROJECT_NAME", "infra".to_owned()),
        ("PIMCORE_KERNEL_CLASS", r"App\Kernel".to_owned()),
    ]
    .map(|(k, v)| (k.to_owned(), v))
    .to_vec()
}

/// Spawn the engine for one makefile/target pair and wait for it.
///
/// `dry_run` adds `--dry-run` so the engine echoes its commands instead of
/// executing them; target discovery runs the self-documentation target for
/// real (its only side effect is printing the listing).
///
/// # Errors
///
/// [`MatrixError::EngineSpawn`] when the process cannot be started at all.
/// A non-zero exit is not an error here; callers decide whether that fails
/// the case or the run.
pub fn invoke(
    ctx: &HarnessContext,
    engine: &EngineSpec,
    makefile: &Utf8Path,
    target: Option<&str>,
    dry_run: bool,
    env: &EnvOverrides,
) -> Result<Capture, MatrixError> {
    let mut command = Command::new(&engine.program);
    command.arg("-f").arg(ctx.root.join(makefile));
    if dry_run {
        command.arg("--dry-run");
    }
    if let Some(target) = target {
        command.arg(target);
    }
    command.current_dir(&ctx.root);
    for (key, value) in baseline_env(ctx) {
        command.env(key, value);
    }
    for (key, value) in env {
        command.env(key, value);
    }

    let output = command.output().map_err(|e| MatrixError::EngineSpawn {
        program: engine.program.clone(),
        reason: e.to_string(),
    })?;

    Ok(Capture {
        stdout: fold_line_endings(ctx, &String::from_utf8_lossy(&output.stdout)),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}

/// Windows captures arrive with CRLF (or bare CR) endings; fold them so
/// line-level comparison is platform-independent.
fn fold_line_endings(ctx: &HarnessContext, text: &str) -> String {
    if ctx.platform == Platform::Windows {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_owned()
    }
}
