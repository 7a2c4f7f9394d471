//! Error types for command execution

use thiserror::Error;

/// Unified error type for command execution
///
/// A command that runs and exits non-zero is *not* an error; it is reported
/// through [`CommandOutput`](crate::CommandOutput). These variants cover the
/// cases where no exit status could be obtained at all.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to spawn a process
    #[error("failed to spawn process: {reason}")]
    SpawnFailed {
        /// The reason for the spawn failure
        reason: String,
    },

    /// Command not found
    #[error("command not found: {command}")]
    CommandNotFound {
        /// The command that was not found
        command: String,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a spawn failed error
    pub fn spawn_failed(reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            reason: reason.into(),
        }
    }

    /// Create a command not found error
    pub fn command_not_found(command: impl Into<String>) -> Self {
        Self::CommandNotFound {
            command: command.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
