//! Stage outcomes and the failure taxonomy

use std::fmt;
use thiserror::Error;

/// The ordered stages of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Merge parameters, deployment context and remote lookups
    Configuration,
    /// Authentication and toolchain checks
    Prerequisites,
    /// Produce the output directory
    Build,
    /// Turn the output directory into one archive
    Package,
    /// Upload the archive to the service instance
    Deploy,
    /// Apply runtime settings
    Settings,
    /// Remove local transient artifacts
    Cleanup,
}

impl Stage {
    /// Operator-facing stage title
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Configuration => "Resolving configuration",
            Stage::Prerequisites => "Checking prerequisites",
            Stage::Build => "Building application",
            Stage::Package => "Packaging artifact",
            Stage::Deploy => "Deploying artifact",
            Stage::Settings => "Configuring settings",
            Stage::Cleanup => "Cleaning up",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Prerequisites => "prerequisites",
            Stage::Build => "build",
            Stage::Package => "package",
            Stage::Deploy => "deploy",
            Stage::Settings => "settings",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Fatal failure kinds; any of these halts the run with exit status 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Target group or service instance could not be resolved
    ConfigUnresolved,
    /// No authenticated cloud control plane session
    AuthenticationMissing,
    /// Build toolchain not installed or not reporting a version
    ToolchainMissing,
    /// Build source directory does not exist
    SourceMissing,
    /// Builder exited non-zero
    BuildFailure,
    /// Output directory does not exist at packaging time
    OutputMissing,
    /// Archive could not be produced
    PackagingFailure,
    /// Upload exited non-zero
    DeploymentFailure,
}

impl FailureKind {
    /// Remediation hint shown next to the error line
    pub fn hint(&self) -> &'static str {
        match self {
            FailureKind::ConfigUnresolved => {
                "pass --target-group and --service-instance, or provision the infrastructure first so the deployment context exists"
            }
            FailureKind::AuthenticationMissing => {
                "run authentication first (e.g. `az login`)"
            }
            FailureKind::ToolchainMissing => {
                "install the build toolchain and make sure it is on PATH"
            }
            FailureKind::SourceMissing => {
                "check project.source_dir in deploy.yaml or pass the right --project-root"
            }
            FailureKind::BuildFailure => "fix the build errors above and re-run",
            FailureKind::OutputMissing => {
                "run without --skip-build to produce the output directory"
            }
            FailureKind::PackagingFailure => {
                "check that the archiver is installed and the output directory is readable"
            }
            FailureKind::DeploymentFailure => {
                "check the service's deployment logs, then re-run the deployment"
            }
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::ConfigUnresolved => "ConfigUnresolved",
            FailureKind::AuthenticationMissing => "AuthenticationMissing",
            FailureKind::ToolchainMissing => "ToolchainMissing",
            FailureKind::SourceMissing => "SourceMissing",
            FailureKind::BuildFailure => "BuildFailure",
            FailureKind::OutputMissing => "OutputMissing",
            FailureKind::PackagingFailure => "PackagingFailure",
            FailureKind::DeploymentFailure => "DeploymentFailure",
        };
        f.write_str(name)
    }
}

/// A fatal stage result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {reason}")]
pub struct StageFailure {
    /// Failure classification
    pub kind: FailureKind,
    /// What went wrong
    pub reason: String,
}

impl StageFailure {
    /// Create a failure
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// Remediation hint for this failure's kind
    pub fn hint(&self) -> &'static str {
        self.kind.hint()
    }
}

/// Non-fatal warning kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// Settings payload incomplete; nothing was applied
    SettingsResolutionFailure,
    /// Settings call exited non-zero
    SettingsApplyFailure,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::SettingsResolutionFailure => f.write_str("SettingsResolutionFailure"),
            WarningKind::SettingsApplyFailure => f.write_str("SettingsApplyFailure"),
        }
    }
}

/// A non-fatal stage result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {reason}")]
pub struct StageWarning {
    /// Warning classification
    pub kind: WarningKind,
    /// What went wrong
    pub reason: String,
}

impl StageWarning {
    /// Create a warning
    pub fn new(kind: WarningKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// Result every stage hands back to the orchestrator
///
/// `T` is the value the stage produces for later stages (the [`Artifact`]
/// for packaging, `()` for the rest). A warning still carries that value.
///
/// [`Artifact`]: crate::Artifact
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T = ()> {
    /// Stage completed
    Success(T),
    /// Stage completed with a non-fatal problem
    Warning(T, StageWarning),
    /// Stage failed; the run must halt
    Fatal(StageFailure),
}

impl<T> StageOutcome<T> {
    /// Fatal outcome of the given kind
    pub fn fatal(kind: FailureKind, reason: impl Into<String>) -> Self {
        StageOutcome::Fatal(StageFailure::new(kind, reason))
    }

    /// Returns true for [`StageOutcome::Fatal`]
    pub fn is_fatal(&self) -> bool {
        matches!(self, StageOutcome::Fatal(_))
    }

    /// The failure, if this outcome is fatal
    pub fn failure(&self) -> Option<&StageFailure> {
        match self {
            StageOutcome::Fatal(failure) => Some(failure),
            _ => None,
        }
    }

    /// The warning, if this outcome carries one
    pub fn warning(&self) -> Option<&StageWarning> {
        match self {
            StageOutcome::Warning(_, warning) => Some(warning),
            _ => None,
        }
    }
}

impl StageOutcome<()> {
    /// Successful outcome with no value
    pub fn success() -> Self {
        StageOutcome::Success(())
    }

    /// Warning outcome with no value
    pub fn warn(kind: WarningKind, reason: impl Into<String>) -> Self {
        StageOutcome::Warning((), StageWarning::new(kind, reason))
    }
}
