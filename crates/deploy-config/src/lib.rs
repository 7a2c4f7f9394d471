//! # Deploy Configuration
//!
//! Everything the deployment pipeline knows before it runs its first stage:
//!
//! - the [`DeploymentContext`] left behind by the infrastructure provisioner,
//!   read through a [`ContextStore`];
//! - the pipeline settings file (`deploy.yaml`), parsed by [`parser`] with
//!   `${VAR}` / `${VAR:-default}` expansion from [`interpolation`];
//! - the [`resolver`] that merges operator parameters, the deployment context
//!   and a remote lookup into one [`ResolvedConfig`].

#![warn(missing_docs)]

use thiserror::Error;

pub mod context;
pub mod interpolation;
pub mod parser;
pub mod resolver;
pub mod settings;

pub use context::{ContextStore, DeploymentContext};
pub use resolver::{
    resolve, InvocationParameters, NoRemoteLookup, ResolutionError, ResolvedConfig,
    ServiceInstanceLookup, ValueSource,
};
pub use settings::{DeployConfig, ProjectLayout};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Deployment context file is not valid JSON of the expected shape
    #[error("Deployment context {path} is unreadable: {source}")]
    ContextParse {
        /// Path of the context file
        path: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Failed to write the deployment context
    #[error("Failed to serialize deployment context: {0}")]
    ContextSerialize(serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Returns the trimmed value if it is present and not blank
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
