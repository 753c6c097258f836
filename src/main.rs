//! mkcheck CLI binary
//!
//! Minimal entrypoint; all logic is in the library and cli::run() handles
//! all output including errors. main only maps to a process exit code.

fn main() {
    if let Err(code) = mkcheck::cli::run() {
        std::process::exit(code.as_i32());
    }
}
