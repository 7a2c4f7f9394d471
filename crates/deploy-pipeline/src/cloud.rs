//! Cloud control plane commands
//!
//! Wraps the control plane CLI behind typed operations. The wrapper never
//! decides what a failure means for the run; stages do that.

use async_trait::async_trait;
use command_executor::{Command, CommandExecutor, CommandOutput};
use deploy_config::settings::CloudSettings;
use deploy_config::ServiceInstanceLookup;
use std::path::Path;
use tracing::{debug, warn};

/// Typed access to the cloud control plane CLI
pub struct CloudControlPlane<'a, E: ?Sized> {
    executor: &'a E,
    settings: &'a CloudSettings,
}

impl<'a, E: CommandExecutor + ?Sized> CloudControlPlane<'a, E> {
    /// Create a control plane wrapper
    pub fn new(executor: &'a E, settings: &'a CloudSettings) -> Self {
        Self { executor, settings }
    }

    fn command(&self) -> Command {
        Command::new(&self.settings.program)
    }

    /// Show the signed-in account; exits zero only with an authenticated session
    pub async fn show_account(&self) -> command_executor::Result<CommandOutput> {
        let mut cmd = self.command();
        cmd.args(["account", "show", "--output", "json"]);
        self.executor.execute(cmd).await
    }

    /// Read one output value of the provisioning deployment in `target_group_id`
    ///
    /// Any failure (command missing, non-zero exit, empty or null value) is
    /// `None`; the caller decides whether that matters.
    pub async fn deployment_output(&self, target_group_id: &str, output_key: &str) -> Option<String> {
        let mut cmd = self.command();
        cmd.args(["deployment", "group", "show", "--resource-group"])
            .arg(target_group_id)
            .arg("--name")
            .arg(&self.settings.deployment_name)
            .arg("--query")
            .arg(format!("properties.outputs.{}.value", output_key))
            .args(["--output", "tsv"]);

        let output = match self.executor.execute(cmd).await {
            Ok(output) => output,
            Err(e) => {
                warn!(output_key, error = %e, "Deployment output query could not run");
                return None;
            }
        };

        if !output.is_success() {
            debug!(
                output_key,
                status = %output.status_description(),
                stderr = %output.diagnostic_tail(3),
                "Deployment output query failed"
            );
            return None;
        }

        match output.stdout_trimmed() {
            Some("null") | Some("None") | None => None,
            Some(value) => Some(value.to_string()),
        }
    }

    /// Upload `archive` to the service instance, replacing existing content and restarting it
    pub async fn deploy_archive(
        &self,
        target_group_id: &str,
        service_instance_id: &str,
        archive: &Path,
    ) -> command_executor::Result<CommandOutput> {
        let mut cmd = self.command();
        cmd.args(["webapp", "deploy", "--resource-group"])
            .arg(target_group_id)
            .arg("--name")
            .arg(service_instance_id)
            .arg("--src-path")
            .arg(archive)
            .args(["--type", "zip", "--clean", "true", "--restart", "true"]);
        self.executor.execute(cmd).await
    }

    /// Apply a batch of application settings in one call
    pub async fn apply_settings(
        &self,
        target_group_id: &str,
        service_instance_id: &str,
        settings: &[(&str, &str)],
    ) -> command_executor::Result<CommandOutput> {
        let mut cmd = self.command();
        cmd.args(["webapp", "config", "appsettings", "set", "--resource-group"])
            .arg(target_group_id)
            .arg("--name")
            .arg(service_instance_id)
            .arg("--settings");
        for (key, value) in settings {
            cmd.arg(format!("{}={}", key, value));
        }
        cmd.args(["--output", "none"]);
        self.executor.execute(cmd).await
    }
}

#[async_trait]
impl<E: CommandExecutor + ?Sized> ServiceInstanceLookup for CloudControlPlane<'_, E> {
    async fn lookup_service_instance(&self, target_group_id: &str) -> Option<String> {
        let key = &self.settings.outputs.service_instance;
        self.deployment_output(target_group_id, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_executor::fake::FakeExecutor;

    #[smol_potat::test]
    async fn test_deployment_output_query_shape() {
        let settings = CloudSettings::default();
        let fake = FakeExecutor::new().with_output(
            "az",
            &["deployment", "group", "show"],
            CommandOutput::success("app-demo\n"),
        );
        let cloud = CloudControlPlane::new(&fake, &settings);

        let value = cloud.deployment_output("rg-demo", "appServiceName").await;
        assert_eq!(value.as_deref(), Some("app-demo"));

        let call = &fake.calls()[0];
        assert_eq!(call.flag_value("--resource-group"), Some("rg-demo"));
        assert_eq!(call.flag_value("--name"), Some("main"));
        assert_eq!(
            call.flag_value("--query"),
            Some("properties.outputs.appServiceName.value")
        );
        assert_eq!(call.flag_value("--output"), Some("tsv"));
    }

    #[smol_potat::test]
    async fn test_deployment_output_failures_are_none() {
        let settings = CloudSettings::default();

        let missing = FakeExecutor::new();
        let cloud = CloudControlPlane::new(&missing, &settings);
        assert_eq!(cloud.deployment_output("rg", "k").await, None);

        let failing = FakeExecutor::new().with_output(
            "az",
            &[],
            CommandOutput::failure(3, "DeploymentNotFound"),
        );
        let cloud = CloudControlPlane::new(&failing, &settings);
        assert_eq!(cloud.deployment_output("rg", "k").await, None);

        let null = FakeExecutor::new().with_output("az", &[], CommandOutput::success("None\n"));
        let cloud = CloudControlPlane::new(&null, &settings);
        assert_eq!(cloud.deployment_output("rg", "k").await, None);
    }

    #[smol_potat::test]
    async fn test_lookup_uses_service_instance_output_key() {
        let mut settings = CloudSettings::default();
        settings.outputs.service_instance = "webAppName".to_string();
        let fake = FakeExecutor::new().with_output("az", &[], CommandOutput::success("app-x"));
        let cloud = CloudControlPlane::new(&fake, &settings);

        assert_eq!(
            cloud.lookup_service_instance("rg-demo").await.as_deref(),
            Some("app-x")
        );
        assert_eq!(
            fake.calls()[0].flag_value("--query"),
            Some("properties.outputs.webAppName.value")
        );
    }

    #[smol_potat::test]
    async fn test_apply_settings_is_one_call() {
        let settings = CloudSettings::default();
        let fake = FakeExecutor::new().with_output("az", &[], CommandOutput::success(""));
        let cloud = CloudControlPlane::new(&fake, &settings);

        cloud
            .apply_settings("rg", "app", &[("A", "1"), ("B", "x=y; z")])
            .await
            .unwrap();

        let calls = fake.calls_to("az", &["webapp", "config", "appsettings", "set"]);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].args.contains(&"A=1".to_string()));
        assert!(calls[0].args.contains(&"B=x=y; z".to_string()));
    }
}
