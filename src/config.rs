//! Configuration model for an installation run.
//!
//! An installation run is described by an [`InstallationConfig`]: the remote
//! endpoint ([`RemoteTarget`]), one [`UploadSpec`] per archive to install, a
//! shared backup directory, and a verbose flag. The config is an in-memory
//! value; callers construct it from CLI flags, from a TOML deploy manifest via
//! [`InstallationConfig::load`], or directly in code.
//!
//! # Deploy manifest format
//!
//! ```toml
//! backup-dir = "/home/ec2-user/bin.old"
//!
//! [target]
//! host = "ec2-xx-xx-xx-xx.compute-1.amazonaws.com"
//! user = "ec2-user"
//! key = "~/.ssh/deploy.pem"
//!
//! [[upload]]
//! path = "/tmp/service_Linux_x86_64.tar.gz"
//! dest = "/usr/local/bin"
//! owner = "root"
//! perm = "0755"
//! bind-low-ports = true
//! ```
//!
//! On the command line the same upload is written as a single repeatable flag:
//! `--upload "path=/tmp/service_Linux_x86_64.tar.gz,dest=/usr/local/bin,owner=root,perm=0755,bindlowports=true"`.
//! Omitted fields take the defaults below.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::core::InstallError;

/// Default destination directory for installed binaries
pub const DEFAULT_DESTINATION_DIR: &str = "/usr/local/bin";
/// Default owner applied to installed binaries (user and group)
pub const DEFAULT_OWNER: &str = "root";
/// Default octal permission mode applied to installed binaries
pub const DEFAULT_PERMISSION: &str = "0755";
/// Default SSH user
pub const DEFAULT_SSH_USER: &str = "ec2-user";
/// Default backup directory for replaced binaries
pub const DEFAULT_BACKUP_DIR: &str = "/home/ec2-user/bin.old";

/// The single remote endpoint an installation run targets.
///
/// Immutable for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteTarget {
    /// Remote host address (e.g. `ec2-xx-xx-xx-xx.compute-1.amazonaws.com`)
    pub host: String,

    /// SSH user for the remote host
    #[serde(default = "default_ssh_user")]
    pub user: String,

    /// Path to the SSH private key (`~` is expanded when loaded from a manifest)
    #[serde(rename = "key")]
    pub key_path: String,
}

/// One archive to install.
///
/// `path` must reference a `.tar.gz` file already present on the remote host;
/// this tool does not transfer archives. `permission` is an octal mode string
/// passed through to `chmod` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct UploadSpec {
    /// Full path to the uploaded tar.gz archive on the remote host
    pub path: String,

    /// Destination directory for the installed binary
    #[serde(rename = "dest", default = "default_destination_dir")]
    pub destination_dir: String,

    /// Owner applied to the installed binary (user and group)
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Octal permission mode string (e.g. "0755"), opaque pass-through
    #[serde(rename = "perm", default = "default_permission")]
    pub permission: String,

    /// Grant `cap_net_bind_service` so the binary can bind ports below 1024
    #[serde(default)]
    pub bind_low_ports: bool,
}

impl FromStr for UploadSpec {
    type Err = InstallError;

    /// Parse the `--upload` flag form: a comma-separated `key=value` list.
    ///
    /// Recognized keys are `path` (required), `dest`, `owner`, `perm`, and
    /// `bindlowports`; unknown keys are rejected rather than ignored so typos
    /// do not silently fall back to defaults.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = Self {
            path: String::new(),
            destination_dir: default_destination_dir(),
            owner: default_owner(),
            permission: default_permission(),
            bind_low_ports: false,
        };

        for part in s.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                return Err(InstallError::UploadSpecParseError {
                    spec: s.to_string(),
                    reason: format!("expected key=value, got '{part}'"),
                });
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "path" => spec.path = value.to_string(),
                "dest" => spec.destination_dir = value.to_string(),
                "owner" => spec.owner = value.to_string(),
                "perm" => spec.permission = value.to_string(),
                "bindlowports" => {
                    spec.bind_low_ports =
                        matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes");
                }
                other => {
                    return Err(InstallError::UploadSpecParseError {
                        spec: s.to_string(),
                        reason: format!("unknown field '{other}'"),
                    });
                }
            }
        }

        if spec.path.is_empty() {
            return Err(InstallError::UploadSpecParseError {
                spec: s.to_string(),
                reason: "missing required field 'path'".to_string(),
            });
        }

        Ok(spec)
    }
}

/// Everything one installation run needs.
///
/// Upload order is irrelevant to the outcome; it only determines which failure
/// is surfaced first when several uploads fail.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct InstallationConfig {
    /// The remote endpoint
    pub target: RemoteTarget,

    /// One entry per archive to install; must be non-empty
    #[serde(rename = "upload", default)]
    pub uploads: Vec<UploadSpec>,

    /// Shared directory on the remote host where replaced binaries are moved
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// Surface composed scripts and raw remote output in logs
    #[serde(skip)]
    pub verbose: bool,
}

impl InstallationConfig {
    /// Load a deploy manifest from a TOML file.
    ///
    /// Expands `~` in the SSH key path. Does not validate the result; callers
    /// (and [`crate::install::install`]) run [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self, InstallError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| InstallError::ManifestReadError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| InstallError::ManifestParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;
        config.target.key_path = shellexpand::tilde(&config.target.key_path).into_owned();
        Ok(config)
    }

    /// Check the config before any remote call is made.
    ///
    /// Missing target fields are a [`InstallError::ConfigError`]; an empty
    /// upload list is [`InstallError::NoUploadsConfigured`].
    pub fn validate(&self) -> Result<(), InstallError> {
        if self.target.host.trim().is_empty() {
            return Err(InstallError::ConfigError {
                message: "remote host is required".to_string(),
            });
        }
        if self.target.user.trim().is_empty() {
            return Err(InstallError::ConfigError {
                message: "ssh user is required".to_string(),
            });
        }
        if self.target.key_path.trim().is_empty() {
            return Err(InstallError::ConfigError {
                message: "ssh key path is required".to_string(),
            });
        }
        if self.uploads.is_empty() {
            return Err(InstallError::NoUploadsConfigured);
        }
        Ok(())
    }
}

fn default_ssh_user() -> String {
    DEFAULT_SSH_USER.to_string()
}

fn default_destination_dir() -> String {
    DEFAULT_DESTINATION_DIR.to_string()
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

fn default_permission() -> String {
    DEFAULT_PERMISSION.to_string()
}

fn default_backup_dir() -> String {
    DEFAULT_BACKUP_DIR.to_string()
}
