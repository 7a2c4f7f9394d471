use super::{exit_code, load_settings};
use anyhow::Result;
use command_executor::LocalExecutor;
use deploy_config::InvocationParameters;
use deploy_pipeline::{ConsoleReporter, Pipeline};
use std::path::Path;

pub async fn run(root: &Path, config_path: &Path, params: &InvocationParameters) -> Result<u8> {
    let config = load_settings(root, config_path)?;
    let pipeline = Pipeline::new(LocalExecutor::new(), ConsoleReporter::new(), config, root);

    let run = pipeline.run(params).await;
    Ok(exit_code(run.exit_code()))
}
