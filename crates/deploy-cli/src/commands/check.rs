use super::{exit_code, load_settings};
use anyhow::Result;
use command_executor::LocalExecutor;
use deploy_config::InvocationParameters;
use deploy_pipeline::{ConsoleReporter, Pipeline, Reporter};
use std::path::Path;

pub async fn run(root: &Path, config_path: &Path, params: &InvocationParameters) -> Result<u8> {
    let config = load_settings(root, config_path)?;
    let pipeline = Pipeline::new(LocalExecutor::new(), ConsoleReporter::new(), config, root);

    let run = pipeline.check(params).await;
    if run.is_success() {
        let layout = pipeline.layout();
        let reporter = pipeline.reporter();
        reporter.info(&format!("Source:  {}", layout.source_dir.display()));
        reporter.info(&format!("Output:  {}", layout.output_dir.display()));
        reporter.info(&format!("Archive: {}", layout.archive_path.display()));
        if !layout.source_dir.is_dir() {
            reporter.warning("Source directory does not exist; deploy would fail");
        }
    }
    Ok(exit_code(run.exit_code()))
}
