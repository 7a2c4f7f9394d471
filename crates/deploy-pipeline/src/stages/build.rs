//! Build stage

use super::{toolchain_command, DIAGNOSTIC_LINES};
use crate::outcome::{FailureKind, StageOutcome};
use crate::report::Reporter;
use command_executor::CommandExecutor;
use deploy_config::settings::ToolchainSettings;
use std::path::Path;
use tracing::{debug, info};

/// Produces a fresh output directory with the build toolchain
pub struct BuildStage<'a, E: ?Sized> {
    executor: &'a E,
    toolchain: &'a ToolchainSettings,
}

impl<'a, E: CommandExecutor + ?Sized> BuildStage<'a, E> {
    /// Create a build stage
    pub fn new(executor: &'a E, toolchain: &'a ToolchainSettings) -> Self {
        Self {
            executor,
            toolchain,
        }
    }

    /// Build `source_dir` into `output_dir`, or do nothing when `skip` is set
    ///
    /// Any existing `output_dir` is removed first so the result only ever
    /// holds files from this build.
    pub async fn run(
        &self,
        source_dir: &Path,
        output_dir: &Path,
        skip: bool,
        reporter: &dyn Reporter,
    ) -> StageOutcome {
        if skip {
            reporter.info("Build skipped, reusing existing output");
            return StageOutcome::success();
        }

        if output_dir.exists() {
            debug!(path = %output_dir.display(), "Removing previous build output");
            if let Err(e) = std::fs::remove_dir_all(output_dir) {
                return StageOutcome::fatal(
                    FailureKind::BuildFailure,
                    format!(
                        "could not remove previous output {}: {}",
                        output_dir.display(),
                        e
                    ),
                );
            }
            reporter.info(&format!("Removed previous output {}", output_dir.display()));
        }

        let cmd = toolchain_command(self.toolchain)
            .arg("publish")
            .arg(source_dir)
            .arg("--configuration")
            .arg(&self.toolchain.configuration)
            .arg("--output")
            .arg(output_dir)
            .build();
        reporter.step(&format!("Running {}", cmd));

        let output = match self.executor.execute(cmd).await {
            Ok(output) => output,
            Err(e) => {
                return StageOutcome::fatal(FailureKind::BuildFailure, e.to_string());
            }
        };

        if !output.is_success() {
            return StageOutcome::fatal(
                FailureKind::BuildFailure,
                format!(
                    "{} publish {}\n{}",
                    self.toolchain.program,
                    output.status_description(),
                    output.diagnostic_tail(DIAGNOSTIC_LINES)
                ),
            );
        }

        info!(path = %output_dir.display(), "Build finished");
        reporter.success(&format!(
            "Built {} configuration into {}",
            self.toolchain.configuration,
            output_dir.display()
        ));
        StageOutcome::success()
    }
}
