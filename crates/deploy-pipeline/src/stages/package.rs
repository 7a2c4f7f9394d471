//! Package stage

use super::DIAGNOSTIC_LINES;
use crate::artifact::Artifact;
use crate::outcome::{FailureKind, StageOutcome};
use crate::report::Reporter;
use command_executor::{Command, CommandExecutor};
use deploy_config::settings::ArchiverSettings;
use std::path::Path;
use tracing::debug;

/// Compresses the output directory into a single archive
pub struct PackageStage<'a, E: ?Sized> {
    executor: &'a E,
    archiver: &'a ArchiverSettings,
}

impl<'a, E: CommandExecutor + ?Sized> PackageStage<'a, E> {
    /// Create a package stage
    pub fn new(executor: &'a E, archiver: &'a ArchiverSettings) -> Self {
        Self { executor, archiver }
    }

    /// Archive the contents of `output_dir` into `archive_path`
    pub async fn run(
        &self,
        output_dir: &Path,
        archive_path: &Path,
        reporter: &dyn Reporter,
    ) -> StageOutcome<Artifact> {
        if !output_dir.is_dir() {
            return StageOutcome::fatal(
                FailureKind::OutputMissing,
                format!("output directory {} does not exist", output_dir.display()),
            );
        }

        // The archiver runs inside the output directory
        let absolute = match std::path::absolute(archive_path) {
            Ok(path) => path,
            Err(e) => {
                return StageOutcome::fatal(
                    FailureKind::PackagingFailure,
                    format!("could not resolve {}: {}", archive_path.display(), e),
                );
            }
        };
        let archive_path = absolute.as_path();

        if archive_path.exists() {
            debug!(path = %archive_path.display(), "Removing previous archive");
            if let Err(e) = std::fs::remove_file(archive_path) {
                return StageOutcome::fatal(
                    FailureKind::PackagingFailure,
                    format!(
                        "could not remove previous archive {}: {}",
                        archive_path.display(),
                        e
                    ),
                );
            }
        }
        if let Some(parent) = archive_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return StageOutcome::fatal(
                    FailureKind::PackagingFailure,
                    format!("could not create {}: {}", parent.display(), e),
                );
            }
        }

        let cmd = Command::builder(&self.archiver.program)
            .args(["-r", "-q"])
            .arg(archive_path)
            .arg(".")
            .current_dir(output_dir)
            .build();
        reporter.step(&format!("Running {}", cmd));

        let output = match self.executor.execute(cmd).await {
            Ok(output) => output,
            Err(e) => return StageOutcome::fatal(FailureKind::PackagingFailure, e.to_string()),
        };
        if !output.is_success() {
            return StageOutcome::fatal(
                FailureKind::PackagingFailure,
                format!(
                    "{} {}\n{}",
                    self.archiver.program,
                    output.status_description(),
                    output.diagnostic_tail(DIAGNOSTIC_LINES)
                ),
            );
        }

        let size_bytes = match std::fs::metadata(archive_path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
            _ => {
                return StageOutcome::fatal(
                    FailureKind::PackagingFailure,
                    format!("archive {} was not produced", archive_path.display()),
                );
            }
        };

        let artifact = Artifact {
            output_dir: output_dir.to_path_buf(),
            archive_path: archive_path.to_path_buf(),
            size_bytes,
        };
        reporter.success(&format!(
            "Created {} ({})",
            archive_path.display(),
            artifact.display_size()
        ));
        StageOutcome::Success(artifact)
    }
}
