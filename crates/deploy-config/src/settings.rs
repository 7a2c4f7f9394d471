//! Pipeline settings (`deploy.yaml`)
//!
//! Every section has defaults, so an absent file or an empty section is
//! valid. Paths are kept as strings until [`DeployConfig::layout`] resolves
//! them against the project root, so that `${VAR}` expansion can run over
//! every value uniformly.

use crate::interpolation::resolve_env_vars;
use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Root settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Settings format version
    pub version: String,
    /// Local paths
    pub project: ProjectSettings,
    /// Build toolchain invocation
    pub toolchain: ToolchainSettings,
    /// Archiver invocation
    pub archiver: ArchiverSettings,
    /// Cloud control plane invocation and query keys
    pub cloud: CloudSettings,
    /// Runtime settings applied to the service
    pub settings: AppSettings,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            project: ProjectSettings::default(),
            toolchain: ToolchainSettings::default(),
            archiver: ArchiverSettings::default(),
            cloud: CloudSettings::default(),
            settings: AppSettings::default(),
        }
    }
}

/// Local paths, relative to the project root unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSettings {
    /// Source directory handed to the build toolchain
    pub source_dir: String,
    /// Directory the build writes its publishable output to
    pub output_dir: String,
    /// Archive file produced from the output directory
    pub archive: String,
    /// Deployment context written by the infrastructure provisioner
    pub context_file: String,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            output_dir: "publish".to_string(),
            archive: "deploy.zip".to_string(),
            context_file: "infra/deployment-context.json".to_string(),
        }
    }
}

/// Build toolchain settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainSettings {
    /// Toolchain executable
    pub program: String,
    /// Build configuration passed to the publish command
    pub configuration: String,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            program: "dotnet".to_string(),
            configuration: "Release".to_string(),
        }
    }
}

/// Archiver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiverSettings {
    /// Archiver executable, invoked as `<program> -r -q <archive> .`
    pub program: String,
}

impl Default for ArchiverSettings {
    fn default() -> Self {
        Self {
            program: "zip".to_string(),
        }
    }
}

/// Cloud control plane settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloudSettings {
    /// Control plane CLI executable
    pub program: String,
    /// Domain the hosted service is published under
    pub platform_domain: String,
    /// Name of the provisioning deployment whose outputs are queried
    pub deployment_name: String,
    /// Output keys of that deployment
    pub outputs: DeploymentOutputs,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            program: "az".to_string(),
            platform_domain: "azurewebsites.net".to_string(),
            deployment_name: "main".to_string(),
            outputs: DeploymentOutputs::default(),
        }
    }
}

/// Output keys of the provisioning deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeploymentOutputs {
    /// Output holding the service instance id
    pub service_instance: String,
    /// Output holding the workload identity client id
    pub workload_identity_client_id: String,
    /// Output holding the database host address
    pub database_host: String,
}

impl Default for DeploymentOutputs {
    fn default() -> Self {
        Self {
            service_instance: "appServiceName".to_string(),
            workload_identity_client_id: "managedIdentityClientId".to_string(),
            database_host: "sqlServerFqdn".to_string(),
        }
    }
}

/// Names and values of the runtime settings the pipeline applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    /// Database name embedded in the connection descriptor
    pub database_name: String,
    /// Setting key receiving the workload identity client id
    pub identity_key: String,
    /// Setting key receiving the connection descriptor
    pub connection_key: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_name: "appdb".to_string(),
            identity_key: "AZURE_CLIENT_ID".to_string(),
            connection_key: "ConnectionStrings__DefaultConnection".to_string(),
        }
    }
}

/// Absolute locations derived from [`ProjectSettings`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root everything else is relative to
    pub root: PathBuf,
    /// Build source directory
    pub source_dir: PathBuf,
    /// Build output directory
    pub output_dir: PathBuf,
    /// Archive file
    pub archive_path: PathBuf,
    /// Deployment context file
    pub context_file: PathBuf,
}

impl ProjectLayout {
    /// Check that the archive does not land inside the output directory
    ///
    /// Paths are compared after lexical normalization, so `./publish/app.zip`
    /// and `publish/../publish/app.zip` are both caught.
    pub fn validate(&self) -> Result<()> {
        let output = normalize(&self.output_dir);
        let archive = normalize(&self.archive_path);
        if archive.starts_with(&output) {
            return Err(ConfigError::ValidationError(format!(
                "archive '{}' must not be inside the output directory '{}'",
                self.archive_path.display(),
                self.output_dir.display()
            )));
        }
        Ok(())
    }
}

/// Drop `.` components and fold `..` into the preceding component
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

impl DeployConfig {
    /// Expand `${VAR}` references in every string value
    pub fn interpolate(&mut self, env_vars: &HashMap<String, String>) -> Result<()> {
        for value in self.string_values_mut() {
            *value = resolve_env_vars(value, env_vars)?;
        }
        Ok(())
    }

    /// Check that the settings describe a runnable pipeline
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("project.source_dir", &self.project.source_dir),
            ("project.output_dir", &self.project.output_dir),
            ("project.archive", &self.project.archive),
            ("project.context_file", &self.project.context_file),
            ("toolchain.program", &self.toolchain.program),
            ("toolchain.configuration", &self.toolchain.configuration),
            ("archiver.program", &self.archiver.program),
            ("cloud.program", &self.cloud.program),
            ("cloud.platform_domain", &self.cloud.platform_domain),
            ("cloud.deployment_name", &self.cloud.deployment_name),
            ("cloud.outputs.service_instance", &self.cloud.outputs.service_instance),
            (
                "cloud.outputs.workload_identity_client_id",
                &self.cloud.outputs.workload_identity_client_id,
            ),
            ("cloud.outputs.database_host", &self.cloud.outputs.database_host),
            ("settings.database_name", &self.settings.database_name),
            ("settings.identity_key", &self.settings.identity_key),
            ("settings.connection_key", &self.settings.connection_key),
        ];

        let empty: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();
        if !empty.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "empty values for {}",
                empty.join(", ")
            )));
        }

        // Any root will do while both paths are relative or both absolute;
        // mixed cases are caught by ProjectLayout::validate at run time
        self.layout(Path::new("/")).validate()
    }

    /// Resolve project paths against `root`
    pub fn layout(&self, root: &Path) -> ProjectLayout {
        ProjectLayout {
            root: root.to_path_buf(),
            source_dir: root.join(&self.project.source_dir),
            output_dir: root.join(&self.project.output_dir),
            archive_path: root.join(&self.project.archive),
            context_file: root.join(&self.project.context_file),
        }
    }

    /// Public URL of a service instance, with `path` appended
    pub fn service_url(&self, service_instance_id: &str, path: &str) -> String {
        format!(
            "https://{}.{}/{}",
            service_instance_id,
            self.cloud.platform_domain,
            path.trim_start_matches('/')
        )
    }

    fn string_values_mut(&mut self) -> [&mut String; 17] {
        [
            &mut self.version,
            &mut self.project.source_dir,
            &mut self.project.output_dir,
            &mut self.project.archive,
            &mut self.project.context_file,
            &mut self.toolchain.program,
            &mut self.toolchain.configuration,
            &mut self.archiver.program,
            &mut self.cloud.program,
            &mut self.cloud.platform_domain,
            &mut self.cloud.deployment_name,
            &mut self.cloud.outputs.service_instance,
            &mut self.cloud.outputs.workload_identity_client_id,
            &mut self.cloud.outputs.database_host,
            &mut self.settings.database_name,
            &mut self.settings.identity_key,
            &mut self.settings.connection_key,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        DeployConfig::default().validate().unwrap();
    }

    #[test]
    fn test_layout_joins_relative_paths() {
        let layout = DeployConfig::default().layout(Path::new("/work/repo"));
        assert_eq!(layout.source_dir, PathBuf::from("/work/repo/src"));
        assert_eq!(layout.output_dir, PathBuf::from("/work/repo/publish"));
        assert_eq!(layout.archive_path, PathBuf::from("/work/repo/deploy.zip"));
        assert_eq!(
            layout.context_file,
            PathBuf::from("/work/repo/infra/deployment-context.json")
        );
    }

    #[test]
    fn test_layout_keeps_absolute_paths() {
        let mut config = DeployConfig::default();
        config.project.archive = "/var/tmp/app.zip".to_string();
        let layout = config.layout(Path::new("/work/repo"));
        assert_eq!(layout.archive_path, PathBuf::from("/var/tmp/app.zip"));
    }

    #[test]
    fn test_archive_inside_output_is_rejected() {
        let mut config = DeployConfig::default();
        config.project.archive = "publish/app.zip".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not be inside"));
    }

    #[test]
    fn test_archive_inside_output_is_rejected_after_normalization() {
        for archive in ["./publish/app.zip", "out/../publish/app.zip", "/srv/app/publish/app.zip"] {
            let mut config = DeployConfig::default();
            config.project.archive = archive.to_string();
            if archive.starts_with('/') {
                config.project.output_dir = "/srv/app/./publish".to_string();
            }
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("must not be inside"), "{}", archive);
        }

        let mut config = DeployConfig::default();
        config.project.archive = "../publish-archives/app.zip".to_string();
        config.validate().unwrap();
    }

    #[test]
    fn test_layout_catches_absolute_archive_under_relative_output() {
        let mut config = DeployConfig::default();
        config.project.archive = "/work/repo/publish/app.zip".to_string();
        config.validate().unwrap();

        let err = config.layout(Path::new("/work/repo")).validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        config.layout(Path::new("/elsewhere")).validate().unwrap();
    }

    #[test]
    fn test_empty_values_are_rejected() {
        let mut config = DeployConfig::default();
        config.cloud.program = " ".to_string();
        config.settings.identity_key = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cloud.program"));
        assert!(err.to_string().contains("settings.identity_key"));
    }

    #[test]
    fn test_service_url() {
        let config = DeployConfig::default();
        assert_eq!(
            config.service_url("app-demo", "/swagger"),
            "https://app-demo.azurewebsites.net/swagger"
        );
    }

    #[test]
    fn test_interpolate_all_values() {
        let mut config = DeployConfig::default();
        config.toolchain.configuration = "${DEPLOY_TEST_CONFIGURATION}".to_string();
        config.cloud.deployment_name = "${DEPLOY_TEST_UNSET_9C1D:-infra}".to_string();

        let mut env = HashMap::new();
        env.insert("DEPLOY_TEST_CONFIGURATION".to_string(), "Debug".to_string());
        config.interpolate(&env).unwrap();

        assert_eq!(config.toolchain.configuration, "Debug");
        assert_eq!(config.cloud.deployment_name, "infra");
    }
}
