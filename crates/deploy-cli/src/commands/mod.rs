pub mod check;
pub mod deploy;

use anyhow::{Context, Result};
use deploy_config::{parser, DeployConfig};
use std::path::Path;

/// Load `deploy.yaml`, or defaults when it does not exist, and check its
/// paths against the project root
pub fn load_settings(root: &Path, path: &Path) -> Result<DeployConfig> {
    let config = parser::load_or_default(path)
        .with_context(|| format!("Failed to load pipeline settings from {}", path.display()))?;
    config
        .layout(root)
        .validate()
        .with_context(|| format!("Invalid project layout under {}", root.display()))?;
    Ok(config)
}

/// Map a run's exit status onto a process exit code
pub fn exit_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
