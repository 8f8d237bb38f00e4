#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tempfile::TempDir;
use tsr::{ImportError, ResourceAddress, StateStore, TerraformCli, TerraformError};

/// Writes a stub `terraform` script into the tempdir. Scripts append their
/// argv to `args.log` in the working directory before responding.
fn stub_terraform(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("terraform");
    fs::write(&path, format!("#!/bin/sh\necho \"$@\" >> args.log\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn args_log(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("args.log")).unwrap_or_default()
}

fn address() -> ResourceAddress {
    ResourceAddress::new("aws_iam_role.exec")
}

#[tokio::test]
async fn test_is_tracked_true_on_success() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(&dir, "exit 0");
    let cli = TerraformCli::with_program(program, dir.path());

    assert!(cli.is_tracked(&address()).await);
    assert!(args_log(&dir).contains("state show -no-color aws_iam_role.exec"));
}

#[tokio::test]
async fn test_is_tracked_false_on_unknown_address() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(
        &dir,
        "echo 'No instance found for the given address!' >&2\nexit 1",
    );
    let cli = TerraformCli::with_program(program, dir.path());

    assert!(!cli.is_tracked(&address()).await);
}

#[tokio::test]
async fn test_is_tracked_false_when_binary_missing() {
    let dir = TempDir::new().unwrap();
    let cli = TerraformCli::with_program(dir.path().join("missing-terraform"), dir.path());

    // Spawn failures read as untracked rather than erroring.
    assert!(!cli.is_tracked(&address()).await);
}

#[tokio::test]
async fn test_import_success_passes_address_and_id() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(&dir, "exit 0");
    let cli = TerraformCli::with_program(program, dir.path());

    cli.import(&address(), "twin-dev-exec").await.unwrap();

    assert!(
        args_log(&dir)
            .contains("import -input=false -no-color aws_iam_role.exec twin-dev-exec")
    );
}

#[tokio::test]
async fn test_import_already_managed_is_classified() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(
        &dir,
        "echo 'Error: Resource already managed by Terraform' >&2\nexit 1",
    );
    let cli = TerraformCli::with_program(program, dir.path());

    let err = cli.import(&address(), "twin-dev-exec").await.unwrap_err();
    assert!(matches!(err, ImportError::AlreadyManaged { .. }));
}

#[tokio::test]
async fn test_import_non_existent_remote_is_classified() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(
        &dir,
        "echo 'Error: Cannot import non-existent remote object' >&2\nexit 1",
    );
    let cli = TerraformCli::with_program(program, dir.path());

    let err = cli.import(&address(), "twin-dev-exec").await.unwrap_err();
    assert!(matches!(err, ImportError::RemoteMissing { .. }));
}

#[tokio::test]
async fn test_import_other_failure_keeps_message() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(&dir, "echo 'Error: Error acquiring the state lock' >&2\nexit 1");
    let cli = TerraformCli::with_program(program, dir.path());

    let err = cli.import(&address(), "twin-dev-exec").await.unwrap_err();
    match err {
        ImportError::Tool { message } => assert!(message.contains("state lock")),
        other => panic!("expected Tool error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_import_missing_binary_is_tool_error() {
    let dir = TempDir::new().unwrap();
    let cli = TerraformCli::with_program(dir.path().join("missing-terraform"), dir.path());

    let err = cli.import(&address(), "twin-dev-exec").await.unwrap_err();
    assert!(matches!(err, ImportError::Tool { .. }));
}

#[tokio::test]
async fn test_select_workspace_passes_or_create() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(&dir, "exit 0");
    let cli = TerraformCli::with_program(program, dir.path());

    cli.select_workspace("dev").await.unwrap();

    assert!(args_log(&dir).contains("workspace select -or-create dev"));
}

#[tokio::test]
async fn test_select_workspace_failure_carries_stderr() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(&dir, "echo 'Backend initialization required' >&2\nexit 1");
    let cli = TerraformCli::with_program(program, dir.path());

    let err = cli.select_workspace("dev").await.unwrap_err();
    match err {
        TerraformError::Command { action, message } => {
            assert_eq!(action, "workspace select");
            assert!(message.contains("Backend initialization required"));
        }
        other => panic!("expected Command error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_output_raw_trims_stdout() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(&dir, "printf 'https://twin.dev.example.com\\n'");
    let cli = TerraformCli::with_program(program, dir.path());

    let url = cli.output_raw("service_url").await.unwrap();
    assert_eq!(url, "https://twin.dev.example.com");
    assert!(args_log(&dir).contains("output -raw service_url"));
}

#[tokio::test]
async fn test_output_raw_failure_is_command_error() {
    let dir = TempDir::new().unwrap();
    let program = stub_terraform(&dir, "echo 'Output \"service_url\" not found' >&2\nexit 1");
    let cli = TerraformCli::with_program(program, dir.path());

    let err = cli.output_raw("service_url").await.unwrap_err();
    assert!(matches!(err, TerraformError::Command { .. }));
}
