//! Runtime settings stage

use crate::cloud::CloudControlPlane;
use crate::outcome::{StageOutcome, WarningKind};
use crate::report::Reporter;
use command_executor::CommandExecutor;
use deploy_config::settings::{AppSettings, CloudSettings};
use deploy_config::{DeploymentContext, ResolvedConfig};
use tracing::{debug, warn};

/// Values the runtime settings are composed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPayload {
    /// Client id of the workload identity the service runs as
    pub workload_identity_client_id: String,
    /// Host name of the database server
    pub database_host_address: String,
}

impl SettingsPayload {
    /// Connection descriptor authenticating to `database_name` with the workload identity
    pub fn connection_descriptor(&self, database_name: &str) -> String {
        format!(
            "Server=tcp:{},1433;Database={};Authentication=Active Directory Managed Identity;User Id={};Encrypt=True;TrustServerCertificate=False;",
            self.database_host_address, database_name, self.workload_identity_client_id
        )
    }
}

/// Resolves and applies the service's runtime settings
pub struct SettingsStage<'a, E: ?Sized> {
    cloud: CloudControlPlane<'a, E>,
    cloud_settings: &'a CloudSettings,
    app: &'a AppSettings,
}

impl<'a, E: CommandExecutor + ?Sized> SettingsStage<'a, E> {
    /// Create a settings stage
    pub fn new(executor: &'a E, cloud: &'a CloudSettings, app: &'a AppSettings) -> Self {
        Self {
            cloud: CloudControlPlane::new(executor, cloud),
            cloud_settings: cloud,
            app,
        }
    }

    /// Resolve the payload, then apply both settings in one call
    ///
    /// Never fatal. An incomplete payload applies nothing.
    pub async fn run(
        &self,
        config: &ResolvedConfig,
        context: Option<&DeploymentContext>,
        reporter: &dyn Reporter,
    ) -> StageOutcome {
        reporter.step("Resolving settings payload");
        let payload = match self.resolve_payload(config, context).await {
            Ok(payload) => payload,
            Err(missing) => {
                let reason = format!("could not resolve {}; no settings applied", missing.join(" or "));
                reporter.warning(&reason);
                return StageOutcome::warn(WarningKind::SettingsResolutionFailure, reason);
            }
        };

        let descriptor = payload.connection_descriptor(&self.app.database_name);
        let batch = [
            (
                self.app.identity_key.as_str(),
                payload.workload_identity_client_id.as_str(),
            ),
            (self.app.connection_key.as_str(), descriptor.as_str()),
        ];

        reporter.step(&format!(
            "Applying {} and {} to {}",
            self.app.identity_key,
            self.app.connection_key,
            config.service_instance_id()
        ));
        let result = self
            .cloud
            .apply_settings(config.target_group_id(), config.service_instance_id(), &batch)
            .await;

        let failure = match result {
            Ok(output) if output.is_success() => None,
            Ok(output) => Some(format!(
                "settings update {}: {}",
                output.status_description(),
                output.diagnostic_tail(3)
            )),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = failure {
            warn!(%reason, "Settings were not applied");
            reporter.warning(&reason);
            return StageOutcome::warn(WarningKind::SettingsApplyFailure, reason);
        }

        reporter.success("Settings applied");
        StageOutcome::success()
    }

    /// Context first, remote query second, per field
    ///
    /// Returns the names of the fields that stayed unresolved on failure.
    async fn resolve_payload(
        &self,
        config: &ResolvedConfig,
        context: Option<&DeploymentContext>,
    ) -> Result<SettingsPayload, Vec<&'static str>> {
        let outputs = &self.cloud_settings.outputs;

        let client_id = match context.and_then(DeploymentContext::workload_identity_client_id) {
            Some(value) => Some(value.to_string()),
            None => {
                self.cloud
                    .deployment_output(config.target_group_id(), &outputs.workload_identity_client_id)
                    .await
            }
        };
        let host = match context.and_then(DeploymentContext::database_host_address) {
            Some(value) => Some(value.to_string()),
            None => {
                self.cloud
                    .deployment_output(config.target_group_id(), &outputs.database_host)
                    .await
            }
        };

        match (client_id, host) {
            (Some(workload_identity_client_id), Some(database_host_address)) => {
                debug!(%database_host_address, "Settings payload resolved");
                Ok(SettingsPayload {
                    workload_identity_client_id,
                    database_host_address,
                })
            }
            (client_id, host) => {
                let mut missing = Vec::new();
                if client_id.is_none() {
                    missing.push("workload identity client id");
                }
                if host.is_none() {
                    missing.push("database host address");
                }
                Err(missing)
            }
        }
    }
}
