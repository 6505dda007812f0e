//! bindrop CLI entry point
//!
//! This is the main executable for the remote binary installer. It handles
//! command-line argument parsing, error display, and command execution.
//!
//! The CLI supports:
//! - `install` - install pre-uploaded tar.gz archives on a remote host
//! - `validate` - check a deploy configuration without contacting the host

use anyhow::Result;
use bindrop::cli;
use bindrop::core::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Convert to a user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
