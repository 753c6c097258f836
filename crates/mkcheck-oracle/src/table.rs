//! Declarative target tables.
//!
//! A table is the per-project data the generic oracle runs on: the
//! makefile under test, its help source files, the init seed paths, the
//! help-entry map, reusable rule fragments, the target→rule mapping and
//! the environment permutations the matrix enumerates. Tables are plain
//! data — TOML on disk or literal structs in tests — so the oracle itself
//! stays project-agnostic.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use mkcheck_utils::EnvOverrides;

/// One step in a target's expected execution path.
///
/// Each variant maps onto a synthesizer (or a literal line, or a reference
/// to a named fragment). Rule lists evaluate in order; order in the
/// resulting command sequence is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PathRule {
    /// Containerized PHP toolchain command.
    ToolRun { inner: String },
    /// Containerized Node toolchain command.
    NodeRun { inner: String },
    /// Application compose invocation; `mode` defaults to the canonical
    /// overlay.
    ComposeUp {
        subcommand: String,
        #[serde(default)]
        mode: Option<String>,
    },
    /// Application compose `exec` as the invoking user.
    ComposeExec {
        inner: String,
        #[serde(default)]
        mode: Option<String>,
    },
    /// Test-runtime compose invocation.
    RuntimeUp { subcommand: String },
    /// Test-runtime compose `exec` with the kernel-class variable.
    RuntimeExec { inner: String },
    /// Image build via buildx bake.
    Buildx { mode: String },
    /// Directory creation plus per-platform ACL grants.
    Permissions { dirs: Vec<String> },
    /// The self-documentation extraction one-liner for this table's help
    /// files.
    HelpPipeline,
    /// The guarded scaffolding copy lines for this table's seed paths.
    Init,
    /// A literal command line, already in the normalized alphabet.
    Literal { line: String },
    /// Splice in a named fragment's rules.
    Fragment { name: String },
}

/// Per-project target table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TargetTable {
    /// Makefile the engine is pointed at, relative to the build root.
    pub makefile: Utf8PathBuf,

    /// Scratch cache directory the driver wipes before every case,
    /// relative to the build root.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: Utf8PathBuf,

    /// Help source files for the self-documentation pipeline, relative to
    /// the build root. Shared template files are appended by the
    /// synthesizer.
    #[serde(default)]
    pub help_files: Vec<Utf8PathBuf>,

    /// Seed paths the `init` target copies into a fresh project.
    #[serde(default)]
    pub init_paths: Vec<String>,

    /// One-line description per public target.
    #[serde(default)]
    pub help: BTreeMap<String, String>,

    /// Named reusable rule lists, unioned into targets via
    /// [`PathRule::Fragment`].
    #[serde(default)]
    pub fragments: BTreeMap<String, Vec<PathRule>>,

    /// Expected execution path per target.
    #[serde(default)]
    pub targets: BTreeMap<String, Vec<PathRule>>,

    /// Environment permutations the matrix enumerates, in order. When
    /// empty, the driver runs the defaults-only permutation.
    #[serde(default)]
    pub permutations: Vec<EnvOverrides>,
}

fn default_scratch_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("var/phpqa")
}

impl TargetTable {
    /// Parse a table from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error for malformed documents; semantic
    /// invariants (help coverage, fragment references) are checked by the
    /// oracle, not here.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Permutations to enumerate, defaults first.
    #[must_use]
    pub fn permutations(&self) -> Vec<EnvOverrides> {
        if self.permutations.is_empty() {
            vec![EnvOverrides::new()]
        } else {
            self.permutations.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_table() {
        let table = TargetTable::from_toml_str(
            r#"
makefile = "resources/PHP/library.mk"
help-files = ["resources/PHP/library.mk", "resources/PHP/common.mk"]
init-paths = ["Common/default", "PHP/library"]
permutations = [[], [["PHP_VERSION", "8.1"]]]

[help]
test = "Test the codebase"
"sh/php" = "Run PHP shell"

[[fragments.phpqa-dirs]]
kind = "literal"
line = "mkdir -p $HOME/.composer"

[[targets.test]]
kind = "fragment"
name = "phpqa-dirs"

[[targets.test]]
kind = "tool-run"
inner = "php vendor/bin/phpunit"

[[targets."sh/php"]]
kind = "tool-run"
inner = "sh"
"#,
        )
        .expect("table parses");

        assert_eq!(table.makefile, "resources/PHP/library.mk");
        assert_eq!(table.scratch_dir, "var/phpqa");
        assert_eq!(table.help_files.len(), 2);
        assert_eq!(table.targets["test"].len(), 2);
        assert_eq!(
            table.targets["test"][0],
            PathRule::Fragment { name: "phpqa-dirs".to_owned() }
        );
        assert_eq!(table.permutations.len(), 2);
        assert!(table.permutations[0].is_empty());
        assert_eq!(table.permutations[1].get("PHP_VERSION"), Some("8.1"));
    }

    #[test]
    fn rule_kinds_roundtrip_through_serde() {
        let rules = vec![
            PathRule::ComposeUp {
                subcommand: "up --detach".to_owned(),
                mode: Some("dev".to_owned()),
            },
            PathRule::Permissions { dirs: vec!["var/cache".to_owned()] },
            PathRule::HelpPipeline,
            PathRule::Init,
        ];
        let toml_text = toml::to_string(&BTreeMap::from([("rules", rules.clone())])).unwrap();
        let back: BTreeMap<String, Vec<PathRule>> = toml::from_str(&toml_text).unwrap();
        assert_eq!(back["rules"], rules);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = TargetTable::from_toml_str("makefile = \"a.mk\"\nbogus = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn empty_permutation_list_defaults_to_one_empty_env() {
        let table = TargetTable::from_toml_str("makefile = \"a.mk\"\n").unwrap();
        let perms = table.permutations();
        assert_eq!(perms.len(), 1);
        assert!(perms[0].is_empty());
    }
}
