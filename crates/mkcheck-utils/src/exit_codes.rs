//! Exit code constants for the mkcheck CLI.
//!
//! Library code returns `Result` and never exits the process; only the CLI
//! maps errors to these codes.

/// Exit code constants for mkcheck.
pub mod codes {
    /// Success - all cases passed.
    pub const SUCCESS: i32 = 0;

    /// Verification failure - a sequence mismatch or an un-mapped target.
    pub const VERIFICATION_FAILED: i32 = 1;

    /// CLI arguments or target-table error.
    pub const CLI_ARGS: i32 = 2;

    /// Engine failure - the orchestration engine could not be spawned.
    pub const ENGINE_FAILURE: i32 = 70;
}

/// Process exit code for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    VerificationFailed,
    CliArgs,
    EngineFailure,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Success => codes::SUCCESS,
            Self::VerificationFailed => codes::VERIFICATION_FAILED,
            Self::CliArgs => codes::CLI_ARGS,
            Self::EngineFailure => codes::ENGINE_FAILURE,
        }
    }
}
