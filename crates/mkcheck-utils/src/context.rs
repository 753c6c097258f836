use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Synthetic home directory the driver exports to the engine.
///
/// The engine process always sees this value as `HOME`, which is what makes
/// home-relative mounts (`$HOME/.composer`, `$HOME/.npm`) reproducible
/// across machines.
pub const SYNTHETIC_HOME: &str = "/home/user";

/// Operating system family of the execution host.
///
/// Determined once per run. Selects which synthesizer variant applies and
/// which line-ending/path-separator convention captured output uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    /// Detect the platform family of the current host.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Darwin
        } else {
            Self::Linux
        }
    }

    /// Spelling used inside template paths (`Common/Platform/<name>`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::Darwin => "Darwin",
            Self::Windows => "Windows",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric identity of the invoking user.
///
/// The containerized-tool synthesizer embeds the real uid/gid so that files
/// created inside the container stay owned by the invoking user. On Windows
/// the flag is omitted entirely, so the values are never read there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
}

impl Identity {
    /// Capture the real process identity.
    #[cfg(unix)]
    #[must_use]
    pub fn current() -> Self {
        // SAFETY: getuid/getgid are always safe to call.
        unsafe {
            Self {
                uid: libc::getuid(),
                gid: libc::getgid(),
            }
        }
    }

    #[cfg(windows)]
    #[must_use]
    pub fn current() -> Self {
        // Never rendered on Windows; the user flag is the empty string there.
        Self { uid: 0, gid: 0 }
    }
}

/// Immutable per-run configuration shared by every harness component.
///
/// Captured once at process start; the normalizer, the synthesizers and the
/// driver all receive a reference instead of reading environment state
/// themselves.
#[derive(Debug, Clone)]
pub struct HarnessContext {
    /// Platform family of the execution host.
    pub platform: Platform,
    /// Absolute path of the build root (the directory holding the templates
    /// under test). All `$ROOT`-token substitutions use this value.
    pub root: Utf8PathBuf,
    /// Home path the engine process sees. All `$HOME`-token substitutions
    /// use this value.
    pub home: Utf8PathBuf,
    /// Identity of the invoking user.
    pub identity: Identity,
}

impl HarnessContext {
    /// Capture a context for `root` on the current host.
    ///
    /// Uses the synthetic home the driver exports, the detected platform and
    /// the real process identity.
    #[must_use]
    pub fn capture(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            platform: Platform::current(),
            root: root.into(),
            home: Utf8PathBuf::from(SYNTHETIC_HOME),
            identity: Identity::current(),
        }
    }

    /// Construct a fully explicit context. Used by tests to pin a platform
    /// or identity independent of the host.
    #[must_use]
    pub fn new(
        platform: Platform,
        root: impl Into<Utf8PathBuf>,
        home: impl Into<Utf8PathBuf>,
        identity: Identity,
    ) -> Self {
        Self {
            platform,
            root: root.into(),
            home: home.into(),
            identity,
        }
    }

    /// The platform-specific template subpath (`Common/Platform/<OS>`)
    /// folded to a token during normalization.
    #[must_use]
    pub fn platform_subpath(&self) -> String {
        format!("Common/Platform/{}", self.platform)
    }

    /// Root path with forward slashes regardless of host convention.
    ///
    /// Captured output may contain the root in either separator form on
    /// Windows; both must collapse to `$ROOT`.
    #[must_use]
    pub fn root_forward_slashes(&self) -> String {
        self.root.as_str().replace('\\', "/")
    }

    /// Resolve a template-relative path against the root.
    #[must_use]
    pub fn resource(&self, rel: impl AsRef<Utf8Path>) -> Utf8PathBuf {
        self.root.join(rel)
    }
}
