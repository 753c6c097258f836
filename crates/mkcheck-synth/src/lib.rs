//! Command-line synthesizers for orchestrated build actions.
//!
//! Each synthesizer is a pure function from (platform, environment,
//! parameters) to the exact command line(s) a template target emits under
//! dry-run. Output is already in the normalized alphabet: machine paths
//! appear only as `$ROOT`/`$HOME` tokens, so predictions compare directly
//! against normalized captures.
//!
//! Default values are bit-for-bit identical to the defaults baked into the
//! orchestration templates; see `defaults`.

pub mod acl;
pub mod compose;
pub mod defaults;
pub mod docker;
pub mod help;
pub mod init;

pub use acl::permission_setup;
pub use compose::{compose_up, compose_up_exec, runtime_up, runtime_up_exec};
pub use defaults::expand_version;
pub use docker::{buildx_bake, node_tool_run, php_tool_run, user_flag};
pub use help::{help_listing, help_pipeline};
pub use init::init_lines;
