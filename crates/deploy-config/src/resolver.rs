//! Configuration resolution
//!
//! Each identifier is resolved independently, first source wins:
//!
//! | field              | 1. parameter | 2. deployment context | 3. remote lookup |
//! |--------------------|--------------|-----------------------|------------------|
//! | target group       | yes          | yes                   | no               |
//! | service instance   | yes          | yes                   | by target group  |
//!
//! The target group is resolved first because the service instance lookup
//! needs it.

use crate::{non_empty, DeploymentContext};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Explicit operator input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationParameters {
    /// Target group override
    pub target_group_id: Option<String>,
    /// Service instance override
    pub service_instance_id: Option<String>,
    /// Reuse the existing output directory instead of building
    pub skip_build: bool,
    /// Apply runtime settings after upload
    pub configure_settings: bool,
}

/// Where a resolved identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Explicit invocation parameter
    Parameter,
    /// Persisted deployment context
    Context,
    /// Query against the cloud control plane
    RemoteLookup,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueSource::Parameter => "parameter",
            ValueSource::Context => "deployment context",
            ValueSource::RemoteLookup => "remote lookup",
        };
        f.write_str(label)
    }
}

/// Fully resolved configuration for one run
///
/// Only [`resolve`] constructs this, so both identifiers are always
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    target_group_id: String,
    service_instance_id: String,
    skip_build: bool,
    configure_settings: bool,
    target_group_source: ValueSource,
    service_instance_source: ValueSource,
}

impl ResolvedConfig {
    /// Target group holding the service
    pub fn target_group_id(&self) -> &str {
        &self.target_group_id
    }

    /// Hosted application being deployed to
    pub fn service_instance_id(&self) -> &str {
        &self.service_instance_id
    }

    /// Whether the build stage is skipped
    pub fn skip_build(&self) -> bool {
        self.skip_build
    }

    /// Whether the settings stage runs
    pub fn configure_settings(&self) -> bool {
        self.configure_settings
    }

    /// Source of the target group id
    pub fn target_group_source(&self) -> ValueSource {
        self.target_group_source
    }

    /// Source of the service instance id
    pub fn service_instance_source(&self) -> ValueSource {
        self.service_instance_source
    }
}

/// Resolution failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No parameter and no context value for the target group
    #[error("target group unresolved")]
    TargetGroupUnresolved,

    /// No parameter, context value or remote output for the service instance
    #[error("service instance unresolved")]
    ServiceInstanceUnresolved {
        /// Target group the remote lookup ran against
        target_group_id: String,
    },
}

/// Remote fallback for the service instance id
#[async_trait]
pub trait ServiceInstanceLookup: Send + Sync {
    /// Look up the service instance provisioned in `target_group_id`
    ///
    /// Any failure, including a missing prior deployment, is `None`.
    async fn lookup_service_instance(&self, target_group_id: &str) -> Option<String>;
}

/// Lookup that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemoteLookup;

#[async_trait]
impl ServiceInstanceLookup for NoRemoteLookup {
    async fn lookup_service_instance(&self, _target_group_id: &str) -> Option<String> {
        None
    }
}

/// Merge parameters, context and remote lookup into a [`ResolvedConfig`]
pub async fn resolve<L>(
    params: &InvocationParameters,
    context: Option<&DeploymentContext>,
    lookup: &L,
) -> Result<ResolvedConfig, ResolutionError>
where
    L: ServiceInstanceLookup + ?Sized,
{
    let (target_group_id, target_group_source) =
        if let Some(value) = non_empty(params.target_group_id.as_deref()) {
            (value.to_string(), ValueSource::Parameter)
        } else if let Some(value) = context.and_then(DeploymentContext::target_group_id) {
            (value.to_string(), ValueSource::Context)
        } else {
            return Err(ResolutionError::TargetGroupUnresolved);
        };
    debug!(%target_group_id, source = %target_group_source, "Resolved target group");

    let (service_instance_id, service_instance_source) =
        if let Some(value) = non_empty(params.service_instance_id.as_deref()) {
            (value.to_string(), ValueSource::Parameter)
        } else if let Some(value) = context.and_then(DeploymentContext::service_instance_id) {
            (value.to_string(), ValueSource::Context)
        } else {
            info!(%target_group_id, "Looking up service instance from prior deployment");
            let found = lookup.lookup_service_instance(&target_group_id).await;
            match non_empty(found.as_deref()) {
                Some(value) => (value.to_string(), ValueSource::RemoteLookup),
                None => {
                    return Err(ResolutionError::ServiceInstanceUnresolved { target_group_id });
                }
            }
        };
    debug!(%service_instance_id, source = %service_instance_source, "Resolved service instance");

    Ok(ResolvedConfig {
        target_group_id,
        service_instance_id,
        skip_build: params.skip_build,
        configure_settings: params.configure_settings,
        target_group_source,
        service_instance_source,
    })
}
