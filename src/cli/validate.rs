//! Check a deploy configuration without contacting the remote host.
//!
//! Validates a manifest (or ad-hoc `--upload` specs), derives the binary name
//! for every upload the way the installer would, and prints the resulting
//! install plan. Useful for catching naming-convention mistakes and manifest
//! typos before a deploy.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{InstallationConfig, UploadSpec};
use crate::naming::derive_binary_name;

/// Command to validate a deploy manifest or upload specs offline.
#[derive(Args)]
pub struct ValidateCommand {
    /// Deploy manifest to validate
    #[arg(long, value_name = "FILE", conflicts_with = "uploads")]
    manifest: Option<PathBuf>,

    /// Upload spec to validate (repeatable)
    #[arg(long = "upload", value_name = "SPEC")]
    uploads: Vec<UploadSpec>,
}

impl ValidateCommand {
    /// Execute the validate command.
    pub async fn execute(self) -> Result<()> {
        let uploads = if let Some(path) = &self.manifest {
            let config = InstallationConfig::load(path)?;
            config.validate()?;
            println!("{} manifest {} is valid", "✓".green(), path.display());
            config.uploads
        } else {
            self.uploads
        };

        if uploads.is_empty() {
            bail!("nothing to validate: pass --manifest or at least one --upload");
        }

        for upload in &uploads {
            let binary_name = derive_binary_name(&upload.path)?;
            let capability = if upload.bind_low_ports {
                ", cap_net_bind_service"
            } else {
                ""
            };
            println!(
                "  {} -> {}/{} (owner {}, mode {}{})",
                upload.path,
                upload.destination_dir,
                binary_name,
                upload.owner,
                upload.permission,
                capability
            );
        }

        println!("{} {} upload(s) OK", "✓".green(), uploads.len());
        Ok(())
    }
}
