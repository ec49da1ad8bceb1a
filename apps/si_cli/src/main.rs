//! `siq` — single-invocation synthesis engine driver, standalone binary.
//!
//! The binary is a thin wrapper around [`si_cli::run_cli`], handling
//! error display, exit codes, and log initialization. All command logic
//! lives in the library crate for testability.
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Error (message printed to stderr)

fn main() {
    env_logger::init();
    if let Err(e) = si_cli::run_cli() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
