//! Cleanup stage

use crate::artifact::Artifact;
use crate::outcome::StageOutcome;
use crate::report::Reporter;
use tracing::warn;

/// Removes the local archive; never fails the run
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupStage;

impl CleanupStage {
    /// Create a cleanup stage
    pub fn new() -> Self {
        Self
    }

    /// Remove the archive if it is still there
    pub fn run(&self, artifact: &Artifact, reporter: &dyn Reporter) -> StageOutcome {
        let path = &artifact.archive_path;
        if !path.exists() {
            reporter.info("No local archive to remove");
            return StageOutcome::success();
        }

        match std::fs::remove_file(path) {
            Ok(()) => reporter.success(&format!("Removed {}", path.display())),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Archive removal failed");
                reporter.warning(&format!("Could not remove {}: {}", path.display(), e));
            }
        }
        StageOutcome::success()
    }
}
