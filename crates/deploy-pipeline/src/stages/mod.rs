//! Pipeline stages
//!
//! Each stage classifies its own failures and returns a
//! [`StageOutcome`](crate::StageOutcome). None of them terminates the
//! process or decides whether later stages run.

mod build;
mod cleanup;
mod deploy;
mod package;
mod prerequisites;
mod settings;

pub use build::BuildStage;
pub use cleanup::CleanupStage;
pub use deploy::DeployStage;
pub use package::PackageStage;
pub use prerequisites::PrerequisiteValidator;
pub use settings::{SettingsPayload, SettingsStage};

use command_executor::command::CommandBuilder;
use command_executor::Command;
use deploy_config::settings::ToolchainSettings;

/// Number of diagnostic lines quoted from a failing tool
pub(crate) const DIAGNOSTIC_LINES: usize = 10;

/// Toolchain invocation with the first-run banner and telemetry turned off
pub(crate) fn toolchain_command(toolchain: &ToolchainSettings) -> CommandBuilder {
    Command::builder(&toolchain.program)
        .env("DOTNET_NOLOGO", "1")
        .env("DOTNET_CLI_TELEMETRY_OPTOUT", "1")
}
