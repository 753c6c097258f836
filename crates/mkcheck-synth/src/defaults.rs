//! Canonical default values shared by templates and synthesizers.
//!
//! These must match the orchestration templates' own defaults exactly: the
//! oracle mirrors the engine's default-resolution order (override if
//! present and non-empty, else the baked-in value), so any drift here shows
//! up as a sequence mismatch on the default permutation.

use mkcheck_utils::EnvOverrides;

/// Substitution marker expanded in image references and inner commands.
pub const VERSION_MARKER: &str = "{version}";

/// Default PHP toolchain version.
pub const PHP_VERSION: &str = "8.3";
/// Default QA container image template.
pub const PHPQA_IMAGE: &str = "jakzal/phpqa:1.97.3-php{version}-alpine";
/// Default Node toolchain version.
pub const NODE_VERSION: &str = "21.7";
/// Default Node container image template.
pub const NODE_IMAGE: &str = "node:{version}-alpine";

/// Default splice value for extra container runtime flags. A single space:
/// the docker-run template splices `DOCKER_ENV` between fixed flags with no
/// separator of its own, so the default reproduces the engine's spacing.
pub const DOCKER_ENV: &str = " ";

/// Default compose overlay mode.
pub const COMPOSE_MODE: &str = "env";
/// Compose project name the test runtime is pinned to.
pub const COMPOSE_PROJECT: &str = "infra";
/// Service UID granted ACL access alongside the invoking user.
pub const SERVICE_UID: &str = "999";
/// Kernel-class variable injected into test-runtime exec invocations.
pub const KERNEL_CLASS: &str = r"PIMCORE_KERNEL_CLASS=App\Kernel";

/// Expand the `{version}` marker in an image or inner-command template.
#[must_use]
pub fn expand_version(template: &str, version: &str) -> String {
    template.replace(VERSION_MARKER, version)
}

/// Resolve the PHP toolchain version for a permutation.
#[must_use]
pub fn php_version<'e>(env: &'e EnvOverrides) -> &'e str {
    env.resolve("PHP_VERSION", PHP_VERSION)
}

/// Resolve the QA image template for a permutation.
#[must_use]
pub fn phpqa_image<'e>(env: &'e EnvOverrides) -> &'e str {
    env.resolve("PHPQA_DOCKER_IMAGE", PHPQA_IMAGE)
}

/// Resolve the Node toolchain version for a permutation.
#[must_use]
pub fn node_version<'e>(env: &'e EnvOverrides) -> &'e str {
    env.resolve("NODE_VERSION", NODE_VERSION)
}

/// Resolve the Node image template for a permutation.
#[must_use]
pub fn node_image<'e>(env: &'e EnvOverrides) -> &'e str {
    env.resolve("NODE_DOCKER_IMAGE", NODE_IMAGE)
}

/// Resolve the extra-runtime-flags splice for a permutation.
///
/// Unlike the version/image variables, an explicitly empty override is kept
/// as-is: the engine splices the raw variable value.
#[must_use]
pub fn docker_env<'e>(env: &'e EnvOverrides) -> &'e str {
    env.get("DOCKER_ENV").unwrap_or(DOCKER_ENV)
}
