//! Tests for local command execution

#![cfg(unix)]

use command_executor::{Command, CommandExecutor, Error, LocalExecutor};

#[smol_potat::test]
async fn test_captures_stdout() {
    let executor = LocalExecutor::new();

    let cmd = Command::builder("echo").arg("hello world").build();
    let output = executor.execute(cmd).await.unwrap();

    assert!(output.is_success());
    assert_eq!(output.exit_code, Some(0));
    assert_eq!(output.signal, None);
    assert_eq!(output.stdout_trimmed(), Some("hello world"));
}

#[smol_potat::test]
async fn test_non_zero_exit_is_not_an_error() {
    let executor = LocalExecutor::new();

    let cmd = Command::builder("sh")
        .arg("-c")
        .arg("echo 'not logged in' >&2; exit 3")
        .build();
    let output = executor.execute(cmd).await.unwrap();

    assert!(!output.is_success());
    assert_eq!(output.exit_code, Some(3));
    assert_eq!(output.diagnostic_tail(1), "not logged in");
}

#[smol_potat::test]
async fn test_command_with_env_vars() {
    let executor = LocalExecutor::new();

    let cmd = Command::builder("sh")
        .arg("-c")
        .arg("echo $TEST_VAR")
        .env("TEST_VAR", "test_value")
        .build();
    let output = executor.execute(cmd).await.unwrap();

    assert_eq!(output.stdout_trimmed(), Some("test_value"));
}

#[smol_potat::test]
async fn test_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
    let executor = LocalExecutor::new();

    let cmd = Command::builder("ls").current_dir(dir.path()).build();
    let output = executor.execute(cmd).await.unwrap();

    assert!(output.is_success());
    assert!(output.stdout.contains("marker.txt"));
}

#[smol_potat::test]
async fn test_missing_program_is_command_not_found() {
    let executor = LocalExecutor::new();

    let cmd = Command::new("definitely-not-a-real-binary-4f2a");
    let err = executor.execute(cmd).await.unwrap_err();

    match err {
        Error::CommandNotFound { command } => {
            assert_eq!(command, "definitely-not-a-real-binary-4f2a")
        }
        other => panic!("expected CommandNotFound, got {other:?}"),
    }
}

#[smol_potat::test]
async fn test_executor_through_shared_reference() {
    async fn run_with<E: CommandExecutor>(executor: E) -> bool {
        executor
            .execute(Command::new("true"))
            .await
            .map(|o| o.is_success())
            .unwrap_or(false)
    }

    let executor = LocalExecutor::new();
    assert!(run_with(&executor).await);
    assert!(run_with(std::sync::Arc::new(executor)).await);
}
