//! Shared helpers for the integration suite.

use std::sync::Mutex;
use std::time::Duration;

use bindrop::config::{InstallationConfig, RemoteTarget, UploadSpec};
use bindrop::core::InstallError;
use bindrop::ssh::RemoteExecutor;

/// Recording stub standing in for the SSH transport.
///
/// Records every script it receives, optionally sleeps to simulate a network
/// round trip, and fails any script mentioning one of the configured needles.
pub struct StubExecutor {
    calls: Mutex<Vec<String>>,
    fail_on: Vec<String>,
    delay: Option<Duration>,
}

impl StubExecutor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Vec::new(),
            delay: None,
        }
    }

    /// Fail any execution whose script contains one of `needles`.
    pub fn failing_on<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fail_on: needles.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    /// Sleep for `delay` on every execution to simulate the network round trip.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    /// Every script executed so far, in completion order.
    pub fn scripts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl RemoteExecutor for StubExecutor {
    async fn execute(&self, _target: &RemoteTarget, script: &str) -> Result<String, InstallError> {
        self.calls.lock().unwrap().push(script.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_on.iter().any(|needle| script.contains(needle)) {
            return Err(InstallError::RemoteExecutionError {
                reason: "remote script exited with status 1".to_string(),
                output: "tar: short read".to_string(),
            });
        }

        Ok(String::new())
    }
}

pub fn target() -> RemoteTarget {
    RemoteTarget {
        host: "example.com".to_string(),
        user: "ec2-user".to_string(),
        key_path: "/keys/deploy.pem".to_string(),
    }
}

/// Config with the given upload paths and defaults everywhere else.
pub fn config_with_uploads(paths: &[&str]) -> InstallationConfig {
    InstallationConfig {
        target: target(),
        uploads: paths
            .iter()
            .map(|path| format!("path={path}").parse::<UploadSpec>().unwrap())
            .collect(),
        backup_dir: "/bak".to_string(),
        verbose: false,
    }
}
