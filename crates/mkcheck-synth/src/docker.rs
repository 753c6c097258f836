//! Containerized tool invocations (`docker run`, `docker buildx bake`).

use mkcheck_utils::{EnvOverrides, HarnessContext, Platform};

use crate::defaults;

/// Current-user flag for container invocations.
///
/// Resolves to the real process identity so files written inside the
/// container stay owned by the invoking user. On Windows the engine omits
/// the flag entirely, so this is the empty string there and the surrounding
/// template spacing is preserved as-is.
#[must_use]
pub fn user_flag(ctx: &HarnessContext) -> String {
    if ctx.platform == Platform::Windows {
        String::new()
    } else {
        format!(r#"--user "{}:{}""#, ctx.identity.uid, ctx.identity.gid)
    }
}

/// Single `docker run` line for a PHP QA toolchain command.
///
/// `inner` is the literal command template run inside the container; a
/// `{version}` marker in it (e.g. `psalm --php-version={version}`) expands
/// to the resolved toolchain version, as does the marker in the image
/// reference. The splice points and double spaces reproduce the template
/// byte-for-byte.
#[must_use]
pub fn php_tool_run(ctx: &HarnessContext, env: &EnvOverrides, inner: &str) -> String {
    let version = defaults::php_version(env);
    let image = defaults::expand_version(defaults::phpqa_image(env), version);
    let inner = defaults::expand_version(inner, version);
    format!(
        r#"docker run --init --interactive  --rm {docker_env}--env "COMPOSER_CACHE_DIR=/composer/cache" {user} --volume "$ROOT/var/phpqa:/cache" --volume "$ROOT:/project" --volume "$HOME/.composer:/composer" --workdir /project {image} {inner}"#,
        docker_env = defaults::docker_env(env),
        user = user_flag(ctx),
    )
}

/// Single `docker run` line for a Node toolchain command.
#[must_use]
pub fn node_tool_run(ctx: &HarnessContext, env: &EnvOverrides, inner: &str) -> String {
    let version = defaults::node_version(env);
    let image = defaults::expand_version(defaults::node_image(env), version);
    let inner = defaults::expand_version(inner, version);
    format!(
        r#"docker run --init --interactive  --rm {docker_env}{user} --volume "$ROOT:$ROOT" --volume "$HOME/.npm:/home/node/.npm" --workdir "$ROOT" {image} {inner}"#,
        docker_env = defaults::docker_env(env),
        user = user_flag(ctx),
    )
}

/// `docker buildx bake` line for an image build in the given mode.
#[must_use]
pub fn buildx_bake(mode: &str) -> String {
    format!(
        "VERSION=latest docker buildx bake --load --file docker-compose.yaml --set *.args.BASE_URL=http://example.com/ --file .infra/docker-buildx/docker-buildx.{mode}.hcl"
    )
}
