//! Runtime-agnostic command execution library
//!
//! Every external tool the deployment pipeline talks to (build toolchain,
//! archiver, cloud control plane) is run through the [`CommandExecutor`]
//! trait. Commands run to completion and report their exit status together
//! with captured stdout and stderr.

#![warn(missing_docs)]

pub mod backends;
pub mod command;
pub mod error;
pub mod executor;
#[cfg(any(test, feature = "test-utils"))]
pub mod fake;
pub mod output;

pub use backends::LocalExecutor;
pub use command::Command;
pub use error::{Error, Result};
pub use executor::CommandExecutor;
pub use output::CommandOutput;
