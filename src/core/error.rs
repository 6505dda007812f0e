//! Error handling for bindrop
//!
//! This module provides the error types and user-friendly error reporting for the
//! remote installer. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`InstallError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **Configuration**: [`InstallError::NoUploadsConfigured`], [`InstallError::ConfigError`],
//!   [`InstallError::ManifestReadError`], [`InstallError::ManifestParseError`],
//!   [`InstallError::UploadSpecParseError`] - detected before any remote call, fatal to the run
//! - **Per-upload**: [`InstallError::InvalidArchiveName`], [`InstallError::TemplateError`],
//!   [`InstallError::RemoteExecutionError`] - fatal to one upload only; sibling uploads
//!   still run to completion
//! - **Attribution**: [`InstallError::UploadFailed`] - wraps a per-upload error with the
//!   originating archive path so the caller can tell which upload failed
//!
//! Use [`user_friendly_error`] to convert any error into a user-friendly format with
//! contextual suggestions.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bindrop operations
///
/// Each variant represents a specific failure mode and carries enough context
/// (archive path, remote output) to identify what went wrong without parsing
/// message strings.
///
/// Per-upload errors never cancel sibling uploads; the orchestrator collects
/// them after every upload has run and surfaces the first failure in upload
/// order, wrapped in [`UploadFailed`](Self::UploadFailed).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    /// The installation config contains no uploads
    ///
    /// Detected during validation, before any remote call is made.
    #[error("no uploads configured")]
    NoUploadsConfigured,

    /// A required configuration field is missing or empty
    #[error("configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The archive file name does not follow the naming convention
    ///
    /// Archive names must look like `<binary>_<platform-qualifier>.tar.gz`;
    /// the binary name is everything before the first underscore. There is no
    /// fallback heuristic: an archive that yields an empty binary name is
    /// rejected before any remote action is taken.
    #[error("unable to derive binary name from '{path}'")]
    InvalidArchiveName {
        /// The archive path that violated the naming convention
        path: String,
    },

    /// The install script template failed to compile or render
    #[error("failed to render install script: {reason}")]
    TemplateError {
        /// The underlying template engine error
        reason: String,
    },

    /// The composed install script exited non-zero on the remote host
    ///
    /// Covers extraction failure, a missing binary after extraction, permission
    /// failure, capability-grant failure, and transport errors alike; the remote
    /// side is not asked to distinguish them beyond its raw output.
    #[error("remote execution failed: {reason}")]
    RemoteExecutionError {
        /// Why the execution failed (exit status, spawn error, timeout)
        reason: String,
        /// Combined stdout/stderr produced before the failure, passed through verbatim
        output: String,
    },

    /// One upload failed; carries the originating archive path
    #[error("failed to process upload '{path}'")]
    UploadFailed {
        /// The archive path of the upload that failed
        path: String,
        /// The underlying per-upload error
        #[source]
        source: Box<InstallError>,
    },

    /// The deploy manifest could not be read
    #[error("failed to read manifest {file}: {reason}")]
    ManifestReadError {
        /// Path to the manifest file
        file: String,
        /// The underlying I/O error
        reason: String,
    },

    /// The deploy manifest is not valid TOML
    #[error("invalid manifest file syntax in {file}")]
    ManifestParseError {
        /// Path to the manifest file that failed to parse
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// A `--upload key=value,...` flag could not be parsed
    #[error("invalid upload spec '{spec}': {reason}")]
    UploadSpecParseError {
        /// The flag value as given on the command line
        spec: String,
        /// Why it could not be parsed
        reason: String,
    },
}

/// User-friendly error wrapper with suggestions and details
///
/// Wraps an [`InstallError`] with an optional actionable suggestion (displayed
/// in green) and optional details (displayed in yellow) for terminal output.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying install error
    pub error: InstallError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from an [`InstallError`]
    #[must_use]
    pub const fn new(error: InstallError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error to stderr with colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let InstallError::UploadFailed { source, .. } = &self.error {
            eprintln!("{}: {}", "caused by".red(), source);
        }

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// Downcasts to [`InstallError`] where possible and attaches suggestions
/// tailored to the specific failure; other errors pass through with their
/// message intact.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(install_error) = error.downcast_ref::<InstallError>() {
        return create_error_context(install_error.clone());
    }

    ErrorContext::new(InstallError::ConfigError {
        message: format!("{error:#}"),
    })
}

/// Attach suggestions and details appropriate to a specific [`InstallError`]
fn create_error_context(error: InstallError) -> ErrorContext {
    match &error {
        InstallError::NoUploadsConfigured => ErrorContext::new(error.clone())
            .with_suggestion(
                "Pass at least one --upload flag, or list an [[upload]] table in the deploy manifest",
            )
            .with_details("An installation run needs at least one archive to install"),

        InstallError::InvalidArchiveName { .. } => ErrorContext::new(error.clone())
            .with_suggestion(
                "Name archives '<binary>_<platform>.tar.gz', e.g. service_Linux_x86_64.tar.gz",
            )
            .with_details(
                "The binary name is derived from everything before the first underscore in the archive file name",
            ),

        InstallError::RemoteExecutionError { output, .. } => {
            let ctx = ErrorContext::new(error.clone()).with_suggestion(
                "Check SSH connectivity, the key path, and that the archive exists on the remote host; re-run with --verbose for the full script and remote output",
            );
            if output.trim().is_empty() {
                ctx
            } else {
                ctx.with_details(format!("remote output:\n{}", output.trim()))
            }
        }

        InstallError::ManifestParseError { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check the TOML syntax in the deploy manifest: quotes, brackets, and key names"),

        InstallError::UploadSpecParseError { .. } => ErrorContext::new(error.clone())
            .with_suggestion(
                "Upload specs look like \"path=/x.tar.gz,dest=/usr/local/bin,owner=root,perm=0755,bindlowports=true\"",
            ),

        // Reuse the inner error's suggestion; the outer variant only adds attribution.
        InstallError::UploadFailed { source, .. } => {
            let inner = create_error_context((**source).clone());
            ErrorContext {
                error,
                suggestion: inner.suggestion,
                details: inner.details,
            }
        }

        _ => ErrorContext::new(error.clone()),
    }
}
