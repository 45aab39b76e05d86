//! Kodegen Bundler Assets - asset bundle pipeline.
//!
//! This binary stages source items, runs the packager over them and maintains
//! the bundle manifests, exiting non-zero when any stage fails.

use kodegen_bundler_assets::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
