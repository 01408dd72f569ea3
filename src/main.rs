//! SFX bundler - signed self-extracting installers for new tab themes.
//!
//! Extracts the extension build, stages it next to the MSI, re-archives it
//! behind the 7-Zip SFX stub and signs the result.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match sfx_bundler::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
