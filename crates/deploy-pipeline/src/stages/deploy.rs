//! Upload stage

use super::DIAGNOSTIC_LINES;
use crate::artifact::Artifact;
use crate::cloud::CloudControlPlane;
use crate::outcome::{FailureKind, StageOutcome};
use crate::report::Reporter;
use command_executor::CommandExecutor;
use deploy_config::settings::CloudSettings;
use deploy_config::ResolvedConfig;
use tracing::info;

/// Uploads the archive, replacing the service's content and restarting it
pub struct DeployStage<'a, E: ?Sized> {
    cloud: CloudControlPlane<'a, E>,
}

impl<'a, E: CommandExecutor + ?Sized> DeployStage<'a, E> {
    /// Create a deploy stage
    pub fn new(executor: &'a E, cloud: &'a CloudSettings) -> Self {
        Self {
            cloud: CloudControlPlane::new(executor, cloud),
        }
    }

    /// Upload `artifact` to the resolved service instance
    ///
    /// A successful upload is never rolled back, whatever happens later.
    pub async fn run(
        &self,
        config: &ResolvedConfig,
        artifact: &Artifact,
        reporter: &dyn Reporter,
    ) -> StageOutcome {
        reporter.step(&format!(
            "Uploading {} to {} in {}",
            artifact.display_size(),
            config.service_instance_id(),
            config.target_group_id()
        ));

        let result = self
            .cloud
            .deploy_archive(
                config.target_group_id(),
                config.service_instance_id(),
                &artifact.archive_path,
            )
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => return StageOutcome::fatal(FailureKind::DeploymentFailure, e.to_string()),
        };
        if !output.is_success() {
            return StageOutcome::fatal(
                FailureKind::DeploymentFailure,
                format!(
                    "upload {}\n{}",
                    output.status_description(),
                    output.diagnostic_tail(DIAGNOSTIC_LINES)
                ),
            );
        }

        info!(
            service_instance = config.service_instance_id(),
            "Artifact deployed"
        );
        reporter.success(&format!("Deployed to {}", config.service_instance_id()));
        StageOutcome::success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use command_executor::fake::FakeExecutor;
    use command_executor::CommandOutput;
    use deploy_config::{resolve, InvocationParameters, NoRemoteLookup};
    use std::path::PathBuf;

    async fn config() -> ResolvedConfig {
        let params = InvocationParameters {
            target_group_id: Some("rg-demo".into()),
            service_instance_id: Some("app-demo".into()),
            ..Default::default()
        };
        resolve(&params, None, &NoRemoteLookup).await.unwrap()
    }

    fn artifact() -> Artifact {
        Artifact {
            output_dir: PathBuf::from("/work/publish"),
            archive_path: PathBuf::from("/work/deploy.zip"),
            size_bytes: 4096,
        }
    }

    #[smol_potat::test]
    async fn test_upload_requests_clean_restart() {
        let fake = FakeExecutor::new().with_output(
            "az",
            &["webapp", "deploy"],
            CommandOutput::success("{}"),
        );
        let cloud = CloudSettings::default();
        let reporter = MemoryReporter::new();

        let outcome = DeployStage::new(&fake, &cloud)
            .run(&config().await, &artifact(), &reporter)
            .await;
        assert_eq!(outcome, StageOutcome::success());

        let call = &fake.calls()[0];
        assert_eq!(call.flag_value("--resource-group"), Some("rg-demo"));
        assert_eq!(call.flag_value("--name"), Some("app-demo"));
        assert_eq!(call.flag_value("--src-path"), Some("/work/deploy.zip"));
        assert_eq!(call.flag_value("--clean"), Some("true"));
        assert_eq!(call.flag_value("--restart"), Some("true"));
    }

    #[smol_potat::test]
    async fn test_upload_failure_is_fatal() {
        let fake = FakeExecutor::new().with_output(
            "az",
            &["webapp", "deploy"],
            CommandOutput::failure(1, "ERROR: Deployment failed with status 400"),
        );
        let cloud = CloudSettings::default();
        let reporter = MemoryReporter::new();

        let outcome = DeployStage::new(&fake, &cloud)
            .run(&config().await, &artifact(), &reporter)
            .await;

        let failure = outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::DeploymentFailure);
        assert!(failure.reason.contains("status 400"));
    }
}
