#![cfg(unix)]

use kidsafe_application::ports::{HostsWriter, WriteStrategy};
use kidsafe_domain::DomainError;
use kidsafe_infrastructure::hosts::{
    default_strategies, ElevatedShell, FallbackHostsWriter, PermissionReset, PrivilegedCopy,
};
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::time::Duration;

mod helpers;
use helpers::*;

const TIMEOUT: Duration = Duration::from_secs(5);

fn hosts_file(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

#[tokio::test]
async fn test_default_chain_order() {
    let names: Vec<&str> = default_strategies(Arc::new(MockCommandRunner::new()), TIMEOUT)
        .iter()
        .map(|s| s.name())
        .collect();

    assert_eq!(
        names,
        vec![
            "direct-write",
            "atomic-rename",
            "elevated-shell",
            "privileged-copy",
            "permission-reset"
        ]
    );
}

#[tokio::test]
async fn test_elevated_shell_uses_non_interactive_sudo() {
    let (_dir, path) = hosts_file("old\n");
    let runner = MockCommandRunner::new();
    let strategy = ElevatedShell::new(Arc::new(runner.clone()), TIMEOUT);

    let _ = strategy.write(&path, "new\n").await;

    let calls = runner.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "sudo");
    assert_eq!(calls[0].1[0], "-n");
    assert_eq!(calls[0].1.last().unwrap(), &path.display().to_string());
}

#[tokio::test]
async fn test_command_success_without_effect_is_failure() {
    let (_dir, path) = hosts_file("old\n");
    let runner = MockCommandRunner::new();
    let strategy = ElevatedShell::new(Arc::new(runner), TIMEOUT);

    let result = strategy.write(&path, "new\n").await;

    assert!(matches!(
        result,
        Err(DomainError::WriteStrategyFailed { ref strategy, .. }) if strategy == "elevated-shell"
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\n");
}

#[tokio::test]
async fn test_privileged_copy_reports_exit_status() {
    let (_dir, path) = hosts_file("old\n");
    let runner = MockCommandRunner::new();
    runner.push_output(1, "sudo: a password is required").await;
    let strategy = PrivilegedCopy::new(Arc::new(runner.clone()), TIMEOUT);

    let result = strategy.write(&path, "new\n").await;

    match result {
        Err(DomainError::WriteStrategyFailed { strategy, reason }) => {
            assert_eq!(strategy, "privileged-copy");
            assert!(reason.contains("password is required"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(runner.programs().await, vec!["sudo"]);
}

#[tokio::test]
async fn test_runner_timeout_is_strategy_failure() {
    let (_dir, path) = hosts_file("old\n");
    let runner = MockCommandRunner::new();
    runner
        .push_error(DomainError::CommandTimeout {
            program: "sudo".to_string(),
            secs: 5,
        })
        .await;
    let strategy = ElevatedShell::new(Arc::new(runner), TIMEOUT);

    assert!(strategy.write(&path, "new\n").await.is_err());
}

#[tokio::test]
async fn test_permission_reset_writes_and_restores_mode() {
    let (_dir, path) = hosts_file("old\n");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    let runner = MockCommandRunner::new();
    let strategy = PermissionReset::new(Arc::new(runner.clone()), TIMEOUT);

    strategy.write(&path, "new\n").await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    let calls = runner.calls().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1[1..3], ["chmod".to_string(), "a+w".to_string()]);
    assert_eq!(calls[1].1[1..3], ["chmod".to_string(), "644".to_string()]);
}

#[tokio::test]
async fn test_permission_reset_restores_even_when_grant_fails() {
    let (_dir, path) = hosts_file("old\n");
    let runner = MockCommandRunner::new();
    runner.push_output(1, "not permitted").await;
    let strategy = PermissionReset::new(Arc::new(runner.clone()), TIMEOUT);

    let result = strategy.write(&path, "new\n").await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\n");
    assert_eq!(runner.calls().await.len(), 2);
}

#[tokio::test]
async fn test_permission_reset_budget_covers_every_command() {
    let (_dir, path) = hosts_file("old\n");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    let runner = MockCommandRunner::with_delay(Duration::from_millis(300));
    let step_timeout = Duration::from_millis(500);
    let writer = FallbackHostsWriter::new(
        vec![Arc::new(PermissionReset::new(Arc::new(runner.clone()), step_timeout))],
        step_timeout,
    );

    writer.write(&path, "new\n").await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    let finished = runner.finished().await;
    assert_eq!(finished.len(), 2);
    assert_eq!(finished[1].1[1..3], ["chmod".to_string(), "644".to_string()]);
}

#[tokio::test]
async fn test_permission_reset_restores_after_caller_gives_up() {
    let (_dir, path) = hosts_file("old\n");
    let runner = MockCommandRunner::with_delay(Duration::from_millis(200));
    let strategy = PermissionReset::new(Arc::new(runner.clone()), TIMEOUT);

    let abandoned =
        tokio::time::timeout(Duration::from_millis(250), strategy.write(&path, "new\n")).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(600)).await;

    let finished = runner.finished().await;
    assert_eq!(finished.len(), 2);
    assert_eq!(finished[1].1[1..3], ["chmod".to_string(), "644".to_string()]);
}

#[test]
fn test_permission_reset_time_budget_exceeds_single_timeout() {
    let strategy = PermissionReset::new(Arc::new(MockCommandRunner::new()), TIMEOUT);
    assert!(strategy.time_budget().unwrap() >= TIMEOUT * 3);
}
