//! Settings file parser

use crate::{DeployConfig, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Parse settings from a YAML string, expanding variables from the process environment
pub fn parse_str(yaml: &str) -> Result<DeployConfig> {
    parse_str_with_env(yaml, &HashMap::new())
}

/// Parse settings from a YAML string, preferring `env_vars` over the process environment
pub fn parse_str_with_env(yaml: &str, env_vars: &HashMap<String, String>) -> Result<DeployConfig> {
    let mut config = if yaml.trim().is_empty() {
        DeployConfig::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    config.interpolate(env_vars)?;
    config.validate()?;
    Ok(config)
}

/// Parse a settings file
pub fn parse_file(path: &Path) -> Result<DeployConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Load the settings file if it exists, otherwise fall back to defaults
pub fn load_or_default(path: &Path) -> Result<DeployConfig> {
    if path.exists() {
        debug!(path = %path.display(), "Loading pipeline settings");
        parse_file(path)
    } else {
        debug!(path = %path.display(), "No settings file, using defaults");
        Ok(DeployConfig::default())
    }
}
