//! Remote execution over SSH.
//!
//! The transport is treated as a black box: a composed install script goes out
//! as one opaque string, combined output and an exit status come back. One
//! attempt per call — retry policy, if any, belongs to the caller — and no
//! interpretation of the output beyond passing it through for diagnostics.
//!
//! [`RemoteExecutor`] is the seam the orchestrator consumes; tests substitute a
//! recording stub, production uses [`SshExecutor`], which shells out to the
//! system `ssh` via [`SshCommand`].

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::RemoteTarget;
use crate::core::InstallError;

/// A single blocking remote command execution.
///
/// Implementations run `script` on `target` and return the combined output on
/// success, or a [`InstallError::RemoteExecutionError`] carrying whatever
/// output was produced before the failure.
pub trait RemoteExecutor {
    /// Execute one composed script on the remote host.
    fn execute(
        &self,
        target: &RemoteTarget,
        script: &str,
    ) -> impl Future<Output = Result<String, InstallError>> + Send;
}

/// Builder for one `ssh` invocation with captured output.
///
/// No timeout is applied by default; the transport's own network-level timeout
/// behavior is trusted. Callers that need a hard bound set one with
/// [`with_timeout`](Self::with_timeout).
pub struct SshCommand {
    user: String,
    host: String,
    key_path: String,
    script: String,
    timeout_duration: Option<Duration>,
    context: Option<String>,
}

impl SshCommand {
    /// Create a command for the given target and script.
    pub fn new(target: &RemoteTarget, script: impl Into<String>) -> Self {
        Self {
            user: target.user.clone(),
            host: target.host.clone(),
            key_path: target.key_path.clone(),
            script: script.into(),
            timeout_duration: None,
            context: None,
        }
    }

    /// Set a hard timeout for the remote execution (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Set a context label for logging (e.g. the upload path)
    ///
    /// Included in debug log messages to distinguish concurrent uploads.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Execute the command and return the combined output.
    ///
    /// A non-zero exit maps to [`InstallError::RemoteExecutionError`] with the
    /// combined stdout/stderr attached verbatim.
    pub async fn execute(self) -> Result<String, InstallError> {
        let destination = format!("{}@{}", self.user, self.host);

        if let Some(ref ctx) = self.context {
            tracing::debug!(
                target: "ssh",
                "({}) Executing: ssh -i {} {}",
                ctx,
                self.key_path,
                destination
            );
        } else {
            tracing::debug!(target: "ssh", "Executing: ssh -i {} {}", self.key_path, destination);
        }

        let mut cmd = Command::new("ssh");
        // BatchMode keeps unattended runs from hanging on a password prompt.
        cmd.args([
            "-i",
            self.key_path.as_str(),
            "-o",
            "BatchMode=yes",
            destination.as_str(),
            self.script.as_str(),
        ]);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result.map_err(|e| spawn_error(&e))?,
                Err(_) => {
                    tracing::warn!(
                        target: "ssh",
                        "Command timed out after {} seconds: ssh {}",
                        duration.as_secs(),
                        destination
                    );
                    return Err(InstallError::RemoteExecutionError {
                        reason: format!(
                            "ssh command timed out after {} seconds",
                            duration.as_secs()
                        ),
                        output: String::new(),
                    });
                }
            }
        } else {
            output_future.await.map_err(|e| spawn_error(&e))?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let combined = match (stdout.is_empty(), stderr.is_empty()) {
            (false, false) => format!("{stdout}\n{stderr}"),
            (false, true) => stdout,
            _ => stderr,
        };

        if !output.status.success() {
            tracing::debug!(
                target: "ssh",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            if !combined.is_empty() {
                tracing::debug!(target: "ssh", "{}", combined.trim());
            }
            let status = output
                .status
                .code()
                .map_or_else(|| "terminated by signal".to_string(), |code| format!("status {code}"));
            return Err(InstallError::RemoteExecutionError {
                reason: format!("remote script exited with {status}"),
                output: combined,
            });
        }

        if !combined.trim().is_empty() {
            if let Some(ref ctx) = self.context {
                tracing::debug!(target: "ssh", "({}) {}", ctx, combined.trim());
            } else {
                tracing::debug!(target: "ssh", "{}", combined.trim());
            }
        }

        Ok(combined)
    }
}

fn spawn_error(error: &std::io::Error) -> InstallError {
    InstallError::RemoteExecutionError {
        reason: format!("failed to execute ssh: {error}"),
        output: String::new(),
    }
}

/// Production [`RemoteExecutor`] backed by the system `ssh` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshExecutor {
    timeout: Option<Duration>,
}

impl SshExecutor {
    /// Create an executor with no execution timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// Apply a hard timeout to every remote execution.
    #[must_use]
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout = duration;
        self
    }
}

impl RemoteExecutor for SshExecutor {
    async fn execute(&self, target: &RemoteTarget, script: &str) -> Result<String, InstallError> {
        SshCommand::new(target, script)
            .with_timeout(self.timeout)
            .with_context(target.host.clone())
            .execute()
            .await
    }
}
