//! Shared foundation for the mkcheck harness.
//!
//! Everything machine-specific the harness needs — platform family, real
//! root/home paths, the numeric identity of the invoking user — is captured
//! once at process start into an immutable [`HarnessContext`] and passed
//! explicitly to every normalizer/synthesizer/oracle call. Nothing in the
//! other crates reads global state ad hoc.

pub mod context;
pub mod env;
pub mod exit_codes;
pub mod logging;

pub use context::{HarnessContext, Identity, Platform};
pub use env::EnvOverrides;
pub use exit_codes::ExitCode;
