//! bindrop - remote installer for pre-uploaded release binaries
//!
//! bindrop installs one or more pre-uploaded, gzip-compressed tar archives onto
//! a single remote host over SSH: it extracts each archive, verifies the
//! expected binary is present, backs up any existing binary of the same name,
//! copies the new binary into place, applies ownership/permission/capability
//! settings, and cleans up temporary state. It is designed for unattended
//! deployment of pre-built release artifacts (e.g. cross-compiled binaries)
//! onto a long-lived server such as a cloud instance.
//!
//! # Architecture Overview
//!
//! Each upload is installed by a single composed shell script dispatched as one
//! SSH call, so the remote side halts at the first failing operation. Uploads
//! run concurrently with isolated failure domains: one upload failing never
//! cancels its siblings, and the aggregated result identifies exactly which
//! uploads failed.
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface (`install`, `validate`)
//! - [`config`] - Configuration model: remote target, upload specs, deploy manifest
//! - [`core`] - Error taxonomy and user-friendly error reporting
//! - [`naming`] - Binary name derivation from the archive naming convention
//! - [`script`] - Install script composition from the compiled template
//! - [`ssh`] - Remote execution: the [`ssh::RemoteExecutor`] seam and the SSH-backed implementation
//! - [`install`] - Parallel orchestration and outcome aggregation
//!
//! # Library Usage
//!
//! The single public entry point is [`install::install`]; the CLI is a thin
//! wrapper around it. Callers construct an [`InstallationConfig`] however they
//! like (flags, TOML manifest, code) and supply a [`ssh::RemoteExecutor`] —
//! the real [`ssh::SshExecutor`] in production, a stub in tests.
//!
//! ```rust,no_run
//! use bindrop::{InstallationConfig, RemoteTarget, UploadSpec};
//! use bindrop::ssh::SshExecutor;
//!
//! # async fn example() -> Result<(), bindrop::InstallError> {
//! let config = InstallationConfig {
//!     target: RemoteTarget {
//!         host: "ec2-xx-xx-xx-xx.compute-1.amazonaws.com".to_string(),
//!         user: "ec2-user".to_string(),
//!         key_path: "/home/me/.ssh/deploy.pem".to_string(),
//!     },
//!     uploads: vec!["path=/tmp/service_Linux_x86_64.tar.gz,bindlowports=true".parse()?],
//!     backup_dir: "/home/ec2-user/bin.old".to_string(),
//!     verbose: false,
//! };
//!
//! bindrop::install(&config, &SshExecutor::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Limitations
//!
//! - Archives must already be present on the remote host; bindrop does not
//!   transfer them.
//! - A failed upload may leave partially-installed state (e.g. the previous
//!   binary already moved aside); nothing is rolled back automatically.
//! - Exactly one remote host per invocation; no inventory management.

pub mod cli;
pub mod config;
pub mod core;
pub mod install;
pub mod naming;
pub mod script;
pub mod ssh;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{InstallationConfig, RemoteTarget, UploadSpec};
pub use install::install;
pub use self::core::{ErrorContext, InstallError, user_friendly_error};
