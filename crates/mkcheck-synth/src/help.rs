//! Self-documentation extraction and rendering.
//!
//! Templates advertise their public targets as `name: ## description`
//! comment rows. The extraction one-liner differs per platform (grep+awk
//! on Linux/Darwin, Select-String on Windows) but all three sort rows by
//! target, pad the name to 20 columns and wrap it in the same ANSI
//! highlight, so the executed listings normalize to identical text.

use camino::Utf8Path;

use mkcheck_normalize::{NormalizeError, normalize};
use mkcheck_utils::{HarnessContext, Platform};

/// Template files every project inherits, appended after the project's own
/// help source files. The platform segment folds to `$PLATFORM` during
/// normalization.
fn common_files(ctx: &HarnessContext) -> [String; 2] {
    [
        "resources/Common/default.mk".to_owned(),
        format!("resources/Common/Platform/{}/default.mk", ctx.platform),
    ]
}

fn native_path(ctx: &HarnessContext, abs: &str) -> String {
    if ctx.platform == Platform::Windows {
        abs.replace('/', "\\")
    } else {
        abs.to_owned()
    }
}

/// Predicted extraction command for the `help` target.
///
/// `project_files` are the project's help source files, relative to the
/// build root; the shared template files are appended automatically. The
/// raw command is built the way the engine prints it (absolute paths,
/// native separators) and then normalized, so the prediction matches the
/// normalized capture byte-for-byte.
///
/// # Errors
///
/// Propagates [`NormalizeError`] if the constructed command cannot be
/// normalized; that means the file list itself was malformed.
pub fn help_pipeline(
    ctx: &HarnessContext,
    project_files: &[impl AsRef<Utf8Path>],
) -> Result<String, NormalizeError> {
    let mut files: Vec<String> = project_files
        .iter()
        .map(|f| ctx.resource(f.as_ref()).into_string())
        .collect();
    files.extend(common_files(ctx).map(|f| ctx.resource(f).into_string()));

    let command = match ctx.platform {
        Platform::Darwin => format!(
            r#"grep --no-filename --extended-regexp '^ *[-a-zA-Z0-9_/]+ *:.*## '  {} | awk 'BEGIN {{FS = ":.*?## "}}; {{printf "\033[45m%-20s\033[0m %s\n", $1, $2}}' | sort"#,
            files.join(" "),
        ),
        Platform::Linux => format!(
            r#"grep -h -E '^ *[-a-zA-Z0-9_/]+ *:.*## ' {} | awk 'BEGIN {{FS = ":.*?## "}}; {{printf "\033[45m%-20s\033[0m %s\n", $1, $2}}' | sort"#,
            files.join(" "),
        ),
        Platform::Windows => {
            // The engine passes the first file natively and rewrites the
            // rest against the template-root variable, which yields the
            // backslash-prefixed resource form.
            let mut entries = Vec::with_capacity(files.len());
            for (index, abs) in files.iter().enumerate() {
                if index == 0 {
                    entries.push(native_path(ctx, abs));
                } else {
                    let tokenized = normalize(ctx, abs)?;
                    entries.push(tokenized.replace("$ROOT/resources", r"$ROOT\resources"));
                }
            }
            format!(
                r#"Select-String -Pattern '^ *(?<name>[-a-zA-Z0-9_/]+) *:.*## *(?<help>.+)' {} | Sort-Object {{$_.Matches[0].Groups["name"]}} | ForEach-Object{{"{{0, -20}}" -f $_.Matches[0].Groups["name"] | Write-Host -NoNewline -BackgroundColor Magenta -ForegroundColor White; " {{0}}" -f $_.Matches[0].Groups["help"] | Write-Host -ForegroundColor White}}"#,
                entries.join(","),
            )
        }
    };

    normalize(ctx, &command)
}

/// Rendered listing the `help` target itself prints: one row per entry,
/// sorted by target name, padded to 20 columns, highlight-wrapped,
/// newline-terminated.
#[must_use]
pub fn help_listing<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut rows: Vec<(&str, &str)> = entries.into_iter().collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (target, description) in rows {
        out.push_str(&format!("\x1b[45m{target:<20}\x1b[0m {description}\n"));
    }
    out
}
