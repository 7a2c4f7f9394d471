//! Local process execution backend

use async_process::Stdio;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::time::Instant;
use tracing::debug;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::executor::CommandExecutor;
use crate::output::CommandOutput;

/// Executor for running processes on the local machine
///
/// Stdin is closed; stdout and stderr are captured in full. The call blocks
/// the awaiting task until the child exits, there is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalExecutor;

impl LocalExecutor {
    /// Create a local executor
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for LocalExecutor {
    async fn execute(&self, command: Command) -> Result<CommandOutput> {
        debug!(command = %command, "Executing local command");
        let started = Instant::now();

        let mut async_cmd = command.prepare();
        async_cmd.stdin(Stdio::null());
        async_cmd.stdout(Stdio::piped());
        async_cmd.stderr(Stdio::piped());

        let output = async_cmd.output().await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::command_not_found(command.get_program().to_string_lossy())
            } else {
                Error::spawn_failed(format!("Failed to spawn {}: {}", command, e))
            }
        })?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            signal: exit_signal(&output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            program = %command.get_program().to_string_lossy(),
            status = %result.status_description(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Local command finished"
        );

        Ok(result)
    }
}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
