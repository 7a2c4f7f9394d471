//! Persisted deployment context
//!
//! The infrastructure provisioner writes a small JSON record with the
//! identifiers of what it created. The pipeline only reads it; `save` exists
//! for tooling and fixtures.

use crate::{non_empty, ConfigError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identifiers produced by a prior provisioning run
///
/// Every field is optional. Blank strings are treated the same as absent
/// ones by the accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentContext {
    /// When the provisioner ran, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at_timestamp: Option<String>,

    /// Target group (resource group) holding the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_group_id: Option<String>,

    /// Hosted application name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_instance_id: Option<String>,

    /// Client id of the workload identity assigned to the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_identity_client_id: Option<String>,

    /// Fully qualified host of the database server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_host_address: Option<String>,
}

impl DeploymentContext {
    /// Target group id, if present and non-blank
    pub fn target_group_id(&self) -> Option<&str> {
        non_empty(self.target_group_id.as_deref())
    }

    /// Service instance id, if present and non-blank
    pub fn service_instance_id(&self) -> Option<&str> {
        non_empty(self.service_instance_id.as_deref())
    }

    /// Workload identity client id, if present and non-blank
    pub fn workload_identity_client_id(&self) -> Option<&str> {
        non_empty(self.workload_identity_client_id.as_deref())
    }

    /// Database host address, if present and non-blank
    pub fn database_host_address(&self) -> Option<&str> {
        non_empty(self.database_host_address.as_deref())
    }

    /// Provisioning time, if the timestamp is present and parses as RFC 3339
    pub fn deployed_at(&self) -> Option<DateTime<Utc>> {
        let raw = non_empty(self.deployed_at_timestamp.as_deref())?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Reads and writes the deployment context file
#[derive(Debug, Clone)]
pub struct ContextStore {
    path: PathBuf,
}

impl ContextStore {
    /// Create a store for the context file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the context file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the context
    ///
    /// A missing file is `Ok(None)`. A file that exists but is not a JSON
    /// object of the expected shape is an error.
    pub fn load(&self) -> Result<Option<DeploymentContext>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No deployment context file");
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let context = serde_json::from_str(&raw).map_err(|source| ConfigError::ContextParse {
            path: self.path.display().to_string(),
            source,
        })?;

        debug!(path = %self.path.display(), "Loaded deployment context");
        Ok(Some(context))
    }

    /// Write the context as pretty-printed JSON, creating parent directories
    pub fn save(&self, context: &DeploymentContext) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(context).map_err(ConfigError::ContextSerialize)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
