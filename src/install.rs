//! Install orchestration: parallel fan-out across uploads.
//!
//! [`install`] is the single public entry point. It validates the config (no
//! remote calls are made on a config error), then runs one task per upload —
//! derive the binary name, render the install script, execute it remotely —
//! with unbounded concurrency. Upload tasks are independent: one failure never
//! cancels or blocks the others, and every upload is attempted to completion
//! before outcomes are aggregated.
//!
//! Aggregation is deterministic: failures are logged individually, and the
//! first failure *in upload order* (not completion order) is returned, wrapped
//! in [`InstallError::UploadFailed`] with the originating archive path.
//!
//! A failed upload may leave partially-installed state behind (e.g. the old
//! binary already moved to backup but the new copy failed). Nothing is rolled
//! back; remediation is the operator's responsibility once notified.

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

use crate::config::{InstallationConfig, RemoteTarget, UploadSpec};
use crate::core::InstallError;
use crate::naming::derive_binary_name;
use crate::script::{ScriptParams, ScriptRenderer};
use crate::ssh::RemoteExecutor;

/// Install every configured upload on the remote host.
///
/// Returns `Ok(())` only if every upload succeeded. On failure, returns the
/// first failed upload in config order as [`InstallError::UploadFailed`];
/// remaining failures are logged at error level.
///
/// # Errors
///
/// - [`InstallError::NoUploadsConfigured`] / [`InstallError::ConfigError`]
///   before any remote call when the config is invalid
/// - [`InstallError::UploadFailed`] when one or more uploads failed
pub async fn install<E>(config: &InstallationConfig, executor: &E) -> Result<(), InstallError>
where
    E: RemoteExecutor + Sync,
{
    config.validate()?;

    let renderer = ScriptRenderer::new()?;
    let renderer = &renderer;

    info!(
        "installing {} upload(s) on {}",
        config.uploads.len(),
        config.target.host
    );

    let mut outcomes: Vec<(usize, Result<(), InstallError>)> =
        stream::iter(config.uploads.iter().enumerate())
            .map(|(index, upload)| async move {
                let result = process_upload(
                    &config.target,
                    upload,
                    &config.backup_dir,
                    config.verbose,
                    renderer,
                    executor,
                )
                .await
                .map_err(|source| InstallError::UploadFailed {
                    path: upload.path.clone(),
                    source: Box::new(source),
                });
                (index, result)
            })
            .buffer_unordered(usize::MAX) // every upload starts immediately
            .collect()
            .await;

    // Completion order is nondeterministic; attribute failures in upload order.
    outcomes.sort_by_key(|(index, _)| *index);

    let mut first_failure = None;
    for (_, outcome) in outcomes {
        if let Err(err) = outcome {
            if let InstallError::UploadFailed { path, source } = &err {
                error!("upload '{path}' failed: {source}");
            }
            if first_failure.is_none() {
                first_failure = Some(err);
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Run the full install sequence for one upload: derive, compose, execute.
async fn process_upload<E>(
    target: &RemoteTarget,
    upload: &UploadSpec,
    backup_dir: &str,
    verbose: bool,
    renderer: &ScriptRenderer,
    executor: &E,
) -> Result<(), InstallError>
where
    E: RemoteExecutor + Sync,
{
    debug!("processing upload: {}", upload.path);

    let binary_name = derive_binary_name(&upload.path)?;
    let params = ScriptParams::for_upload(upload, &binary_name, backup_dir);
    let script = renderer.render(&params)?;

    debug!(target: "install", "install script for {}:\n{}", upload.path, script);

    match executor.execute(target, &script).await {
        Ok(output) => {
            if !output.trim().is_empty() {
                debug!(target: "install", "remote output for {}:\n{}", upload.path, output.trim());
            }
            info!("installed '{}' from {}", binary_name, upload.path);
            Ok(())
        }
        Err(err) => {
            if verbose {
                error!(
                    target: "install",
                    "install script for {} failed:\n{}",
                    upload.path,
                    script
                );
                if let InstallError::RemoteExecutionError { output, .. } = &err {
                    if !output.trim().is_empty() {
                        error!(target: "install", "remote output:\n{}", output.trim());
                    }
                }
            }
            Err(err)
        }
    }
}
