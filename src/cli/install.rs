//! Install pre-uploaded archives on the remote host.
//!
//! Builds an [`InstallationConfig`] either from individual flags (`--host`,
//! `--key`, repeatable `--upload` specs) or from a TOML deploy manifest
//! (`--manifest`), then runs the parallel install against the real SSH
//! executor. The two sources are mutually exclusive; mixing flag-provided
//! uploads with a manifest would make it ambiguous which config is in effect.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{InstallationConfig, RemoteTarget, UploadSpec};
use crate::install;
use crate::ssh::SshExecutor;

/// Command to install archives from flags or a deploy manifest.
#[derive(Args)]
pub struct InstallCommand {
    /// Remote host address (e.g. ec2-xx-xx-xx-xx.compute-1.amazonaws.com)
    #[arg(long, required_unless_present = "manifest", conflicts_with = "manifest")]
    host: Option<String>,

    /// SSH user for the remote host
    #[arg(long, default_value = crate::config::DEFAULT_SSH_USER)]
    user: String,

    /// Path to the SSH private key
    #[arg(
        long,
        value_name = "FILE",
        required_unless_present = "manifest",
        conflicts_with = "manifest"
    )]
    key: Option<String>,

    /// Upload spec "path=/x.tar.gz,dest=/usr/local/bin,owner=root,perm=0755,bindlowports=true"
    /// (repeatable; only `path` is required)
    #[arg(long = "upload", value_name = "SPEC")]
    uploads: Vec<UploadSpec>,

    /// Backup directory on the remote host for replaced binaries
    #[arg(long, value_name = "DIR", default_value = crate::config::DEFAULT_BACKUP_DIR)]
    backup_dir: String,

    /// Load the whole installation config from a TOML deploy manifest
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Hard timeout in seconds for each remote execution (no timeout when unset)
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,
}

impl InstallCommand {
    /// Execute the install command.
    pub async fn execute(self, verbose: bool) -> Result<()> {
        let timeout = self.timeout.map(Duration::from_secs);
        let config = self.into_config(verbose)?;
        let executor = SshExecutor::new().with_timeout(timeout);

        install::install(&config, &executor).await?;

        println!(
            "{} {} upload(s) installed on {}",
            "✓".green(),
            config.uploads.len(),
            config.target.host
        );
        Ok(())
    }

    /// Build the installation config from the manifest or from flags.
    fn into_config(self, verbose: bool) -> Result<InstallationConfig> {
        let mut config = if let Some(path) = &self.manifest {
            if !self.uploads.is_empty() {
                bail!("--upload cannot be combined with --manifest");
            }
            InstallationConfig::load(path)?
        } else {
            InstallationConfig {
                target: RemoteTarget {
                    host: self.host.unwrap_or_default(),
                    user: self.user,
                    key_path: shellexpand::tilde(&self.key.unwrap_or_default()).into_owned(),
                },
                uploads: self.uploads,
                backup_dir: self.backup_dir,
                verbose: false,
            }
        };
        config.verbose = verbose;
        Ok(config)
    }
}
