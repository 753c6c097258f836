//! Project scaffolding (init) lines.
//!
//! The harness does not verify file copying itself, only the guarded copy
//! lines the `init` target emits for its seed-path list.

/// Rename guard emitted after every seed-path copy.
const GITATTRIBUTES_GUARD: &str =
    "if [ -f .gitattributes.dist ]; then mv .gitattributes.dist .gitattributes; fi";

/// Expected dry-run lines for the `init` target: one guarded copy per seed
/// path, each followed by the `.gitattributes.dist` rename guard.
#[must_use]
pub fn init_lines(seed_paths: &[impl AsRef<str>]) -> Vec<String> {
    let mut lines = Vec::with_capacity(seed_paths.len() * 2);
    for path in seed_paths {
        let path = path.as_ref();
        lines.push(format!(
            r#"if [ -d "$ROOT/resources/{path}" ]; then cp -a $ROOT/resources/{path}/. .; fi"#
        ));
        lines.push(GITATTRIBUTES_GUARD.to_owned());
    }
    lines
}
