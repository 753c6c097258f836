//! End-to-end matrix tests against a stub engine.
//!
//! The stub is a small shell script that replays the listing and dry-run
//! output a real engine would produce for a tiny project, so the full
//! CLEAN → INVOKE → CAPTURE → NORMALIZE → COMPARE path runs hermetically.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use mkcheck::{
    CaseOutcome, EngineSpec, EnvOverrides, HarnessContext, MatrixDriver, MatrixError, Oracle,
    TargetTable,
};

const TABLE: &str = r#"
makefile = "Makefile"
help-files = ["Makefile"]

[help]
clean = "Clear caches"
help = "Prints this help"
"sh/php" = "Run PHP shell"
test = "Test the codebase"

[[targets.help]]
kind = "help-pipeline"

[[targets.clean]]
kind = "literal"
line = "rm -rf var/cache/* var/log/*"

[[targets."sh/php"]]
kind = "literal"
line = "mkdir -p $HOME/.composer"

[[targets."sh/php"]]
kind = "tool-run"
inner = "sh"

[[targets.test]]
kind = "literal"
line = "mkdir -p $HOME/.composer"

[[targets.test]]
kind = "tool-run"
inner = "php -d pcov.enabled=1 vendor/bin/phpunit --coverage-text"

[[targets.test]]
kind = "tool-run"
inner = "infection run --no-interaction --threads max"
"#;

struct Stub {
    root: TempDir,
    ctx: HarnessContext,
    table: TargetTable,
    engine: EngineSpec,
}

/// Write a stub engine whose per-target output is taken from the oracle's
/// own predictions (plus any explicit overrides), then hand back the
/// pieces a driver needs.
fn stub_project(table_toml: &str, overrides: &[(&str, &str)]) -> Stub {
    let root = TempDir::new().expect("create stub project root");
    let root_path = Utf8PathBuf::from_path_buf(
        root.path().canonicalize().expect("canonicalize root"),
    )
    .expect("utf-8 root");
    let ctx = HarnessContext::capture(root_path.clone());

    let table = TargetTable::from_toml_str(table_toml).expect("stub table parses");
    let oracle = Oracle::new(&table);

    let mut script = String::from("#!/bin/sh\nfor last; do :; done\ncase \"$last\" in\n");
    for target in table.targets.keys() {
        let body = overrides
            .iter()
            .find(|(name, _)| *name == target.as_str())
            .map(|(_, body)| (*body).to_owned())
            .unwrap_or_else(|| {
                if target == "help" {
                    oracle.help_listing().expect("listing renders")
                } else {
                    let mut lines = oracle
                        .expected_for(&ctx, &EnvOverrides::new(), target)
                        .expect("prediction exists")
                        .join("\n");
                    lines.push('\n');
                    lines
                }
            });
        script.push_str(&format!("\"{target}\")\ncat <<'MKEOF'\n{body}MKEOF\n;;\n"));
    }
    script.push_str("*)\necho \"unknown target $last\" >&2\nexit 2\n;;\nesac\n");

    let engine_path = root.path().join("engine.sh");
    fs::write(&engine_path, script).expect("write stub engine");
    fs::set_permissions(&engine_path, fs::Permissions::from_mode(0o755))
        .expect("mark stub executable");

    let engine = EngineSpec::new(engine_path.to_str().expect("utf-8 engine path"));
    Stub { root, ctx, table, engine }
}

#[test]
fn matrix_passes_when_engine_matches_predictions() {
    let stub = stub_project(TABLE, &[]);
    let driver = MatrixDriver::new(&stub.ctx, stub.engine.clone(), &stub.table);

    let report = driver.run().expect("matrix runs");
    assert!(report.is_success(), "unexpected failures: {report:?}");
    // One case per (permutation, target); defaults-only permutation here.
    assert_eq!(report.cases.len(), 4);
}

#[test]
fn scratch_directory_is_wiped_before_cases() {
    let stub = stub_project(TABLE, &[]);
    let scratch = stub.root.path().join("var/phpqa");
    fs::create_dir_all(&scratch).expect("seed scratch dir");
    fs::write(scratch.join("stale"), "leftover").expect("seed stale file");

    let driver = MatrixDriver::new(&stub.ctx, stub.engine.clone(), &stub.table);
    driver.run().expect("matrix runs");

    assert!(!scratch.exists(), "scratch dir should be removed per case");
}

#[test]
fn mismatch_reports_both_sequences() {
    let stub = stub_project(TABLE, &[("clean", "rm -rf var/log/* only\n")]);
    let driver = MatrixDriver::new(&stub.ctx, stub.engine.clone(), &stub.table);

    let report = driver.run().expect("matrix runs");
    assert_eq!(report.failed(), 1);
    let case = report
        .cases
        .iter()
        .find(|c| c.target == "clean")
        .expect("clean case present");
    match &case.outcome {
        CaseOutcome::Mismatch { expected, actual } => {
            assert_eq!(expected, &["rm -rf var/cache/* var/log/*"]);
            assert_eq!(actual, &["rm -rf var/log/* only"]);
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[test]
fn engine_failure_attaches_stderr() {
    let stub = stub_project(
        TABLE,
        // A case body that fails instead of printing commands.
        &[("clean", "")],
    );
    // Rewrite the stub so `clean` exits non-zero with a message.
    let engine_path = stub.root.path().join("engine.sh");
    let script = fs::read_to_string(&engine_path).unwrap().replace(
        "\"clean\")\ncat <<'MKEOF'\nMKEOF\n",
        "\"clean\")\necho 'no rule to make target' >&2\nexit 3\n",
    );
    fs::write(&engine_path, script).unwrap();

    let driver = MatrixDriver::new(&stub.ctx, stub.engine.clone(), &stub.table);
    let report = driver.run().expect("matrix runs");
    let case = report
        .cases
        .iter()
        .find(|c| c.target == "clean")
        .expect("clean case present");
    match &case.outcome {
        CaseOutcome::EngineFailure { exit_code, stderr } => {
            assert_eq!(*exit_code, Some(3));
            assert!(stderr.contains("no rule to make target"));
        }
        other => panic!("expected engine failure, got {other:?}"),
    }
}

#[test]
fn unmapped_real_target_aborts_before_comparisons() {
    // The stub advertises a target the table does not map.
    let listing_with_drift = {
        let table = TargetTable::from_toml_str(TABLE).unwrap();
        let oracle = Oracle::new(&table);
        let mut listing = oracle.help_listing().unwrap();
        listing.push_str("\x1b[45mdeploy              \x1b[0m Ship it\n");
        listing
    };
    let stub = stub_project(TABLE, &[("help", &listing_with_drift)]);

    let driver = MatrixDriver::new(&stub.ctx, stub.engine.clone(), &stub.table);
    let err = driver.run().expect_err("drift must abort the run");
    match err {
        MatrixError::Drift { target } => assert_eq!(target, "deploy"),
        other => panic!("expected drift error, got {other}"),
    }
}

#[test]
fn discovery_failure_is_fatal() {
    let stub = stub_project(TABLE, &[]);
    let engine_path = stub.root.path().join("engine.sh");
    let script = "#!/bin/sh\necho 'makefile not found' >&2\nexit 2\n";
    fs::write(&engine_path, script).unwrap();
    fs::set_permissions(&engine_path, fs::Permissions::from_mode(0o755)).unwrap();

    let driver = MatrixDriver::new(&stub.ctx, stub.engine.clone(), &stub.table);
    let err = driver.run().expect_err("discovery failure must abort");
    match err {
        MatrixError::Discovery { exit_code, stderr } => {
            assert_eq!(exit_code, Some(2));
            assert!(stderr.contains("makefile not found"));
        }
        other => panic!("expected discovery error, got {other}"),
    }
}

mod cli {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn write_table(stub: &Stub) -> std::path::PathBuf {
        let path = stub.root.path().join("table.toml");
        fs::write(&path, TABLE).expect("write table");
        path
    }

    #[test]
    fn matrix_cli_passes_and_reports_counts() {
        let stub = stub_project(TABLE, &[]);
        let table_path = write_table(&stub);

        Command::cargo_bin("mkcheck")
            .expect("binary builds")
            .args([
                "matrix",
                "--root",
                stub.root.path().to_str().unwrap(),
                "--table",
                table_path.to_str().unwrap(),
                "--engine",
                stub.engine.program.as_str(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("4 passed, 0 failed"));
    }

    #[test]
    fn matrix_cli_fails_on_drift_naming_the_target() {
        let listing_with_drift = {
            let table = TargetTable::from_toml_str(TABLE).unwrap();
            let oracle = Oracle::new(&table);
            let mut listing = oracle.help_listing().unwrap();
            listing.push_str("\x1b[45mdeploy              \x1b[0m Ship it\n");
            listing
        };
        let stub = stub_project(TABLE, &[("help", &listing_with_drift)]);
        let table_path = write_table(&stub);

        Command::cargo_bin("mkcheck")
            .expect("binary builds")
            .args([
                "matrix",
                "--root",
                stub.root.path().to_str().unwrap(),
                "--table",
                table_path.to_str().unwrap(),
                "--engine",
                stub.engine.program.as_str(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("\"deploy\""));
    }

    #[test]
    fn matrix_cli_emits_json_reports() {
        let stub = stub_project(TABLE, &[]);
        let table_path = write_table(&stub);

        let output = Command::cargo_bin("mkcheck")
            .expect("binary builds")
            .args([
                "matrix",
                "--root",
                stub.root.path().to_str().unwrap(),
                "--table",
                table_path.to_str().unwrap(),
                "--engine",
                stub.engine.program.as_str(),
                "--json",
            ])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let report: serde_json::Value =
            serde_json::from_slice(&output).expect("valid JSON report");
        assert_eq!(report["cases"].as_array().unwrap().len(), 4);
        for case in report["cases"].as_array().unwrap() {
            assert_eq!(case["outcome"], "pass");
        }
    }
}
