//! Orchestration behavior: validation short-circuit, failure isolation,
//! deterministic attribution, and parallel dispatch.

use std::time::{Duration, Instant};

use bindrop::core::InstallError;
use bindrop::install;

use crate::common::{StubExecutor, config_with_uploads};

#[tokio::test]
async fn empty_uploads_fail_without_remote_calls() {
    bindrop::test_utils::init_test_logging(None);
    let executor = StubExecutor::new();
    let config = config_with_uploads(&[]);

    let err = install(&config, &executor).await.unwrap_err();

    assert_eq!(err, InstallError::NoUploadsConfigured);
    assert!(executor.scripts().is_empty(), "no remote call may be made");
}

#[tokio::test]
async fn missing_target_fields_fail_without_remote_calls() {
    let executor = StubExecutor::new();
    let mut config = config_with_uploads(&["/tmp/svc_Linux_x86_64.tar.gz"]);
    config.target.key_path = String::new();

    let err = install(&config, &executor).await.unwrap_err();

    assert!(matches!(err, InstallError::ConfigError { .. }));
    assert!(executor.scripts().is_empty());
}

#[tokio::test]
async fn failing_upload_does_not_cancel_siblings() {
    let executor = StubExecutor::failing_on(["beta_Linux"]);
    let config = config_with_uploads(&[
        "/tmp/alpha_Linux_x86_64.tar.gz",
        "/tmp/beta_Linux_x86_64.tar.gz",
        "/tmp/gamma_Linux_x86_64.tar.gz",
    ]);

    let err = install(&config, &executor).await.unwrap_err();

    // All three executions were attempted despite the failure.
    assert_eq!(executor.scripts().len(), 3);

    match err {
        InstallError::UploadFailed { path, source } => {
            assert_eq!(path, "/tmp/beta_Linux_x86_64.tar.gz");
            assert!(matches!(*source, InstallError::RemoteExecutionError { .. }));
        }
        other => panic!("expected UploadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn first_failure_is_reported_in_upload_order() {
    // Both the 2nd and 3rd upload fail; the aggregated error must name the 2nd.
    let executor = StubExecutor::failing_on(["beta_Linux", "gamma_Linux"]);
    let config = config_with_uploads(&[
        "/tmp/alpha_Linux_x86_64.tar.gz",
        "/tmp/beta_Linux_x86_64.tar.gz",
        "/tmp/gamma_Linux_x86_64.tar.gz",
    ]);

    let err = install(&config, &executor).await.unwrap_err();

    match err {
        InstallError::UploadFailed { path, .. } => {
            assert_eq!(path, "/tmp/beta_Linux_x86_64.tar.gz");
        }
        other => panic!("expected UploadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn naming_violation_fails_only_that_upload() {
    let executor = StubExecutor::new();
    let config = config_with_uploads(&["/tmp/alpha_Linux_x86_64.tar.gz", "/tmp/_bad.tar.gz"]);

    let err = install(&config, &executor).await.unwrap_err();

    // The bad upload never reaches the executor; the good one still runs.
    assert_eq!(executor.scripts().len(), 1);
    assert!(executor.scripts()[0].contains("alpha_Linux_x86_64.tar.gz"));

    match err {
        InstallError::UploadFailed { path, source } => {
            assert_eq!(path, "/tmp/_bad.tar.gz");
            assert!(matches!(*source, InstallError::InvalidArchiveName { .. }));
        }
        other => panic!("expected UploadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn all_uploads_succeeding_returns_ok() {
    let executor = StubExecutor::new();
    let config = config_with_uploads(&[
        "/tmp/alpha_Linux_x86_64.tar.gz",
        "/tmp/beta_Linux_x86_64.tar.gz",
    ]);

    install(&config, &executor).await.expect("success");
    assert_eq!(executor.scripts().len(), 2);
}

#[tokio::test]
async fn uploads_are_dispatched_in_parallel() {
    // With a 150ms round trip per upload, sequential fan-out would take ~600ms.
    let delay = Duration::from_millis(150);
    let executor = StubExecutor::with_delay(delay);
    let config = config_with_uploads(&[
        "/tmp/a_Linux_x86_64.tar.gz",
        "/tmp/b_Linux_x86_64.tar.gz",
        "/tmp/c_Linux_x86_64.tar.gz",
        "/tmp/d_Linux_x86_64.tar.gz",
    ]);

    let start = Instant::now();
    install(&config, &executor).await.expect("success");
    let elapsed = start.elapsed();

    assert_eq!(executor.scripts().len(), 4);
    assert!(elapsed >= delay, "stub delay must apply");
    assert!(
        elapsed < delay * 3,
        "wall time should track the slowest upload, not the sum (took {elapsed:?})"
    );
}

#[tokio::test]
async fn concurrent_uploads_get_distinct_temp_dirs() {
    let executor = StubExecutor::new();
    let config = config_with_uploads(&[
        "/tmp/alpha_Linux_x86_64.tar.gz",
        "/tmp/beta_Linux_x86_64.tar.gz",
    ]);

    install(&config, &executor).await.expect("success");

    let scripts = executor.scripts();
    let temp_dir = |script: &str| {
        script
            .lines()
            .find(|line| line.starts_with("mkdir -p \"/tmp/bindrop-install-"))
            .expect("temp dir mkdir")
            .to_string()
    };
    assert_ne!(temp_dir(&scripts[0]), temp_dir(&scripts[1]));
}
