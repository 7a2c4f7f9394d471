//! Authentication and toolchain checks

use super::toolchain_command;
use crate::cloud::CloudControlPlane;
use crate::outcome::{FailureKind, StageOutcome};
use crate::report::Reporter;
use command_executor::CommandExecutor;
use deploy_config::settings::{CloudSettings, ToolchainSettings};
use tracing::debug;

/// Confirms a cloud session exists and the build toolchain is installed
pub struct PrerequisiteValidator<'a, E: ?Sized> {
    executor: &'a E,
    cloud: CloudControlPlane<'a, E>,
    toolchain: &'a ToolchainSettings,
}

impl<'a, E: CommandExecutor + ?Sized> PrerequisiteValidator<'a, E> {
    /// Create a validator
    pub fn new(executor: &'a E, cloud: &'a CloudSettings, toolchain: &'a ToolchainSettings) -> Self {
        Self {
            executor,
            cloud: CloudControlPlane::new(executor, cloud),
            toolchain,
        }
    }

    /// Run both checks in order; the first failure wins
    pub async fn validate(&self, reporter: &dyn Reporter) -> StageOutcome {
        if let StageOutcome::Fatal(failure) = self.check_authentication(reporter).await {
            return StageOutcome::Fatal(failure);
        }
        self.check_toolchain(reporter).await
    }

    async fn check_authentication(&self, reporter: &dyn Reporter) -> StageOutcome {
        reporter.step("Checking cloud session");

        let output = match self.cloud.show_account().await {
            Ok(output) => output,
            Err(e) => {
                return StageOutcome::fatal(
                    FailureKind::AuthenticationMissing,
                    format!("cloud CLI unavailable: {}", e),
                );
            }
        };

        if !output.is_success() {
            return StageOutcome::fatal(
                FailureKind::AuthenticationMissing,
                "no authenticated cloud session",
            );
        }

        match describe_account(&output.stdout) {
            Some(account) => reporter.success(&format!("Authenticated as {}", account)),
            None => reporter.success("Authenticated"),
        }
        StageOutcome::success()
    }

    async fn check_toolchain(&self, reporter: &dyn Reporter) -> StageOutcome {
        reporter.step(&format!("Checking {} toolchain", self.toolchain.program));

        let cmd = toolchain_command(self.toolchain).arg("--version").build();
        let output = match self.executor.execute(cmd).await {
            Ok(output) => output,
            Err(e) => {
                return StageOutcome::fatal(
                    FailureKind::ToolchainMissing,
                    format!("{} is not installed: {}", self.toolchain.program, e),
                );
            }
        };

        match output.stdout_trimmed() {
            Some(version) if output.is_success() => {
                let version = version.lines().next().unwrap_or(version);
                reporter.success(&format!("{} {}", self.toolchain.program, version));
                StageOutcome::success()
            }
            _ => StageOutcome::fatal(
                FailureKind::ToolchainMissing,
                format!(
                    "{} did not report a version ({})",
                    self.toolchain.program,
                    output.status_description()
                ),
            ),
        }
    }
}

/// "user (subscription)" from `account show` JSON, when present
fn describe_account(json: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Account output is not JSON");
            return None;
        }
    };

    let user = value.pointer("/user/name").and_then(|v| v.as_str());
    let subscription = value.get("name").and_then(|v| v.as_str());
    match (user, subscription) {
        (Some(user), Some(subscription)) => Some(format!("{} ({})", user, subscription)),
        (Some(user), None) => Some(user.to_string()),
        (None, Some(subscription)) => Some(subscription.to_string()),
        (None, None) => None,
    }
}
