//! Command-line interface for bindrop.
//!
//! Each command is implemented as a separate module with its own argument
//! structure and execution logic:
//!
//! - `install` - install pre-uploaded archives on the remote host
//! - `validate` - check a deploy configuration without contacting the host
//!
//! # Global Options
//!
//! All commands support:
//! - `--verbose` - debug output, including full install scripts and raw remote output
//! - `--quiet` - errors only, for automation
//!
//! # Example
//!
//! ```bash
//! bindrop install \
//!     --host ec2-xx-xx-xx-xx.compute-1.amazonaws.com \
//!     --key ~/.ssh/deploy.pem \
//!     --upload "path=/tmp/service_Linux_x86_64.tar.gz,bindlowports=true"
//!
//! bindrop validate --manifest deploy.toml
//! ```

mod install;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Main CLI structure for bindrop.
///
/// Global flags follow standard Unix conventions; `--verbose` and `--quiet`
/// are mutually exclusive and only affect diagnostic logging, never control
/// flow or exit status.
#[derive(Parser)]
#[command(
    name = "bindrop",
    about = "Install pre-uploaded release binaries on a remote host over SSH",
    version,
    author,
    long_about = "bindrop installs pre-uploaded tar.gz release archives on a single remote \
                  host: extract, verify, back up the old binary, copy the new one into place, \
                  apply ownership/permissions, and optionally grant cap_net_bind_service."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (full install scripts and raw remote output)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors for automation
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Install pre-uploaded archives on the remote host.
    ///
    /// See [`install::InstallCommand`] for detailed options and behavior.
    Install(install::InstallCommand),

    /// Check a deploy configuration without contacting the remote host.
    ///
    /// See [`validate::ValidateCommand`] for detailed options and behavior.
    Validate(validate::ValidateCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// Initializes logging from the global flags, then dispatches to the
    /// subcommand handler.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        match self.command {
            Commands::Install(cmd) => cmd.execute(self.verbose).await,
            Commands::Validate(cmd) => cmd.execute().await,
        }
    }
}

/// Initialize the tracing subscriber from the verbosity flags.
///
/// `RUST_LOG` still wins for fine-grained control when neither flag is set.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
