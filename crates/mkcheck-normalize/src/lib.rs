//! Output normalization for captured dry-run command streams.
//!
//! Captured engine output depends on the executing machine: absolute paths,
//! ANSI styling, and per-platform separator conventions. [`normalize`]
//! rewrites a raw multi-line block so it can be compared byte-for-byte
//! against the oracle's prediction. After normalization the only
//! machine-specific strings left are the three symbolic tokens `$ROOT`,
//! `$HOME` and `$PLATFORM`.
//!
//! The steps are ordered; later ones depend on earlier substitutions:
//!
//! 1. strip ANSI CSI and OSC sequences;
//! 2. replace the real root path (native and forward-slash form), the real
//!    home path, and the platform template subpath with tokens — literal
//!    substitutions only, never a blanket separator conversion, because
//!    lines like `App\Kernel` carry backslashes that must survive;
//! 3. per line, canonicalize every `$ROOT`-anchored path run: backslashes
//!    inside the run become forward slashes and `.`/`..` segments collapse
//!    under the usual path-stack rules.
//!
//! Ambiguous output is a harness bug, not a soft error: a malformed token
//! run fails with [`NormalizeError`] instead of degrading to a best-effort
//! guess.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use mkcheck_utils::HarnessContext;

/// Token substituted for the build root's absolute path.
pub const ROOT_TOKEN: &str = "$ROOT";
/// Token substituted for the home directory the engine sees.
pub const HOME_TOKEN: &str = "$HOME";
/// Token substituted for the OS segment of the platform template subpath.
pub const PLATFORM_TOKEN: &str = "$PLATFORM";

// CSI: ESC [ parameters... final-letter. Covers the color/style escapes the
// self-documentation output emits.
static ANSI_CSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("valid CSI pattern"));

// OSC: ESC ] payload terminated by BEL or ESC \.
static ANSI_OSC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)").expect("valid OSC pattern"));

/// Normalization failure.
///
/// Raised when the normalizer's internal invariants are violated. These are
/// harness bugs (or hopelessly ambiguous engine output) and abort the case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Two root tokens with nothing between them: the path run cannot be
    /// attributed to either occurrence.
    #[error("ambiguous root-token run in line: {line}")]
    AmbiguousTokenRun { line: String },
}

/// Strip ANSI CSI and OSC sequences.
#[must_use]
pub fn strip_ansi(input: &str) -> String {
    let stripped = ANSI_CSI.replace_all(input, "");
    ANSI_OSC.replace_all(&stripped, "").into_owned()
}

/// Normalize a captured multi-line block.
///
/// Pure function of its input plus the context's root/home constants and
/// platform. Idempotent: normalizing already-normalized output is a no-op.
///
/// # Errors
///
/// Returns [`NormalizeError`] when a `$ROOT`-anchored run cannot be parsed
/// unambiguously.
pub fn normalize(ctx: &HarnessContext, raw: &str) -> Result<String, NormalizeError> {
    let stripped = strip_ansi(raw);
    let substituted = substitute_tokens(ctx, &stripped);

    let mut lines = Vec::new();
    for line in substituted.split('\n') {
        if line.contains(ROOT_TOKEN) {
            lines.push(canonicalize_line(line)?);
        } else {
            lines.push(line.to_owned());
        }
    }
    Ok(lines.join("\n"))
}

/// Step 2: literal token substitutions.
///
/// Order matters: the root's native form first, then its forward-slash
/// form, then home, then the platform subpath in both separator forms.
fn substitute_tokens(ctx: &HarnessContext, input: &str) -> String {
    let subpath_fwd = ctx.platform_subpath();
    let subpath_native = subpath_fwd.replace('/', "\\");
    let platform_fwd = format!("Common/Platform/{PLATFORM_TOKEN}");
    let platform_native = format!("Common\\Platform\\{PLATFORM_TOKEN}");

    input
        .replace(ctx.root.as_str(), ROOT_TOKEN)
        .replace(&ctx.root_forward_slashes(), ROOT_TOKEN)
        .replace(ctx.home.as_str(), HOME_TOKEN)
        .replace(&subpath_fwd, &platform_fwd)
        .replace(&subpath_native, &platform_native)
}

/// Step 3: canonicalize every `$ROOT`-anchored run within one line.
///
/// A run is the token plus the immediately following non-whitespace,
/// non-comma characters; a trailing comma is a delimiter, not part of the
/// run, so comma-separated path lists keep their commas.
fn canonicalize_line(line: &str) -> Result<String, NormalizeError> {
    let parts: Vec<&str> = line.split(ROOT_TOKEN).collect();
    let mut out = String::with_capacity(line.len());
    out.push_str(parts[0]);

    for (i, part) in parts[1..].iter().enumerate() {
        let is_last = i == parts.len() - 2;
        if part.is_empty() && !is_last {
            return Err(NormalizeError::AmbiguousTokenRun {
                line: line.to_owned(),
            });
        }
        let stop = part
            .find(|c: char| c.is_whitespace() || c == ',')
            .unwrap_or(part.len());
        let (body, rest) = part.split_at(stop);
        out.push_str(&collapse_run(body));
        out.push_str(rest);
    }
    Ok(out)
}

/// Rewrite one run body (everything after the token): backslash separators
/// become forward slashes, then `.`/`..` segments collapse.
fn collapse_run(body: &str) -> String {
    let converted = body.replace('\\', "/");
    if !converted.contains('/') {
        // No separators: `$ROOT` alone or a suffix like `:$ROOT` mounts.
        let mut run = String::from(ROOT_TOKEN);
        run.push_str(&converted);
        return run;
    }

    let mut stack: Vec<&str> = Vec::new();
    for segment in converted.split('/').skip(1) {
        match segment {
            "." => {}
            ".." => {
                if stack.is_empty() || stack.last() == Some(&"..") {
                    stack.push("..");
                } else {
                    stack.pop();
                }
            }
            other => stack.push(other),
        }
    }

    // The first split element (text glued directly to the token, e.g. a
    // drive-relative suffix) reattaches before the first separator.
    let head = converted.split('/').next().unwrap_or_default();
    let mut run = String::from(ROOT_TOKEN);
    run.push_str(head);
    for segment in stack {
        run.push('/');
        run.push_str(segment);
    }
    run
}
