//! The executor capability every pipeline stage depends on

use crate::command::Command;
use crate::error::Result;
use crate::output::CommandOutput;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs a command to completion and reports its exit status and output
///
/// Implementations must not interpret the exit status: a non-zero exit is a
/// successful execution with a failing [`CommandOutput`]. `Err` is reserved
/// for commands that could not be run at all.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command and wait for it to complete, capturing output
    async fn execute(&self, command: Command) -> Result<CommandOutput>;
}

#[async_trait]
impl<E: CommandExecutor + ?Sized> CommandExecutor for Arc<E> {
    async fn execute(&self, command: Command) -> Result<CommandOutput> {
        (**self).execute(command).await
    }
}

#[async_trait]
impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    async fn execute(&self, command: Command) -> Result<CommandOutput> {
        (**self).execute(command).await
    }
}
