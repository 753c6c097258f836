//! Compose-based service invocations.

use mkcheck_utils::HarnessContext;

use crate::defaults;
use crate::docker::user_flag;

/// Application compose invocation with the mode overlay file.
///
/// `mode` picks the overlay (`docker-compose.<mode>.yaml`); pass
/// [`defaults::COMPOSE_MODE`] for the canonical default.
#[must_use]
pub fn compose_up(subcommand: &str, mode: &str) -> String {
    format!(
        "VERSION=latest docker compose --file docker-compose.yaml --file .infra/docker-compose/docker-compose.{mode}.yaml {subcommand}"
    )
}

/// `exec` variant of [`compose_up`]: runs `inner` in the `app` service as
/// the invoking user.
#[must_use]
pub fn compose_up_exec(ctx: &HarnessContext, inner: &str, mode: &str) -> String {
    compose_up(&format!("exec {} app {inner}", user_flag(ctx)), mode)
}

/// Test-runtime compose invocation, pinned to the fixed project name.
#[must_use]
pub fn runtime_up(subcommand: &str) -> String {
    format!(
        "COMPOSE_PROJECT_NAME={} docker compose --file tests/runtime/docker-compose.yaml {subcommand}",
        defaults::COMPOSE_PROJECT
    )
}

/// `exec` variant of [`runtime_up`]: injects the kernel-class variable next
/// to the current-user flag.
#[must_use]
pub fn runtime_up_exec(ctx: &HarnessContext, inner: &str) -> String {
    runtime_up(&format!(
        "exec {} --env {} app {inner}",
        user_flag(ctx),
        defaults::KERNEL_CLASS
    ))
}
