//! Stage sequencing
//!
//! The [`Pipeline`] owns the settings and the resolved configuration for a
//! run. It never reinterprets a stage's outcome: `Fatal` halts, `Warning`
//! is recorded and the run continues.

use crate::artifact::Artifact;
use crate::cloud::CloudControlPlane;
use crate::outcome::{FailureKind, Stage, StageFailure, StageOutcome, StageWarning};
use crate::report::Reporter;
use crate::stages::{
    BuildStage, CleanupStage, DeployStage, PackageStage, PrerequisiteValidator, SettingsStage,
};
use command_executor::CommandExecutor;
use deploy_config::{
    resolve, ContextStore, DeployConfig, DeploymentContext, InvocationParameters, ProjectLayout,
    ResolvedConfig,
};
use std::path::Path;
use tracing::{info, warn};

/// Where and why a run stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    /// Stage that returned the fatal outcome
    pub stage: Stage,
    /// The failure itself
    pub failure: StageFailure,
}

/// Public endpoints of a completed deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSummary {
    /// Target group deployed into
    pub target_group_id: String,
    /// Service instance deployed to
    pub service_instance_id: String,
    /// Application landing page
    pub app_url: String,
    /// API explorer page
    pub swagger_url: String,
}

/// Everything a finished run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineRun {
    /// Resolved configuration, once resolution succeeded
    pub resolved: Option<ResolvedConfig>,
    /// Stages that returned success or a warning, in order
    pub completed: Vec<Stage>,
    /// Warnings collected along the way
    pub warnings: Vec<StageWarning>,
    /// Set when a stage returned a fatal outcome
    pub halted: Option<Halt>,
    /// Artifact created by the package stage
    pub artifact: Option<Artifact>,
    /// Set only when the run went through cleanup
    pub summary: Option<DeploymentSummary>,
}

impl PipelineRun {
    /// Returns true if no stage was fatal
    pub fn is_success(&self) -> bool {
        self.halted.is_none()
    }

    /// Process exit status: 0 on success, 1 on any fatal outcome
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    /// The archive, if this run created one and it is still on disk
    ///
    /// A run halted after packaging leaves its archive behind.
    pub fn leftover_archive(&self) -> Option<&Path> {
        self.artifact
            .as_ref()
            .map(|artifact| artifact.archive_path.as_path())
            .filter(|path| path.exists())
    }
}

/// The deployment pipeline
pub struct Pipeline<E, R> {
    executor: E,
    reporter: R,
    config: DeployConfig,
    layout: ProjectLayout,
}

impl<E: CommandExecutor, R: Reporter> Pipeline<E, R> {
    /// Create a pipeline for the project at `root`
    pub fn new(executor: E, reporter: R, config: DeployConfig, root: &Path) -> Self {
        let layout = config.layout(root);
        Self {
            executor,
            reporter,
            config,
            layout,
        }
    }

    /// The executor external tools run through
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// The progress reporter
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Pipeline settings
    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Absolute project paths
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Run every stage in order, halting on the first fatal outcome
    pub async fn run(&self, params: &InvocationParameters) -> PipelineRun {
        let mut run = PipelineRun::default();

        let Some((config, context)) = self.configure(params, &mut run).await else {
            return run;
        };
        if !self.prerequisites(&mut run).await {
            return run;
        }

        self.reporter.stage(Stage::Build);
        if !config.skip_build() && !self.layout.source_dir.is_dir() {
            let failure = StageFailure::new(
                FailureKind::SourceMissing,
                format!(
                    "source directory {} does not exist",
                    self.layout.source_dir.display()
                ),
            );
            self.halt(&mut run, Stage::Build, failure);
            return run;
        }
        let outcome = BuildStage::new(&self.executor, &self.config.toolchain)
            .run(
                &self.layout.source_dir,
                &self.layout.output_dir,
                config.skip_build(),
                &self.reporter,
            )
            .await;
        if self.record(&mut run, Stage::Build, outcome).is_none() {
            return run;
        }

        self.reporter.stage(Stage::Package);
        let outcome = PackageStage::new(&self.executor, &self.config.archiver)
            .run(&self.layout.output_dir, &self.layout.archive_path, &self.reporter)
            .await;
        let Some(artifact) = self.record(&mut run, Stage::Package, outcome) else {
            return run;
        };
        run.artifact = Some(artifact.clone());

        self.reporter.stage(Stage::Deploy);
        let outcome = DeployStage::new(&self.executor, &self.config.cloud)
            .run(&config, &artifact, &self.reporter)
            .await;
        if self.record(&mut run, Stage::Deploy, outcome).is_none() {
            return run;
        }

        self.reporter.stage(Stage::Settings);
        if config.configure_settings() {
            let outcome =
                SettingsStage::new(&self.executor, &self.config.cloud, &self.config.settings)
                    .run(&config, context.as_ref(), &self.reporter)
                    .await;
            self.record(&mut run, Stage::Settings, outcome);
        } else {
            self.reporter
                .info("Skipped; pass --configure-settings to apply runtime settings");
        }

        self.reporter.stage(Stage::Cleanup);
        let outcome = CleanupStage::new().run(&artifact, &self.reporter);
        self.record(&mut run, Stage::Cleanup, outcome);

        let summary = self.summarize(&config);
        self.reporter.success(&format!(
            "Deployment of {} complete",
            summary.service_instance_id
        ));
        self.reporter.info(&format!("App:     {}", summary.app_url));
        self.reporter.info(&format!("Swagger: {}", summary.swagger_url));
        if !run.warnings.is_empty() {
            self.reporter.warning(&format!(
                "Finished with {} warning(s)",
                run.warnings.len()
            ));
        }
        info!(service_instance = %summary.service_instance_id, "Pipeline finished");
        run.summary = Some(summary);
        run
    }

    /// Resolve configuration and validate prerequisites without touching anything
    pub async fn check(&self, params: &InvocationParameters) -> PipelineRun {
        let mut run = PipelineRun::default();

        let Some((config, _)) = self.configure(params, &mut run).await else {
            return run;
        };
        if !self.prerequisites(&mut run).await {
            return run;
        }

        self.reporter.success(&format!(
            "Ready to deploy {} to {}",
            self.layout.source_dir.display(),
            self.config.service_url(config.service_instance_id(), "")
        ));
        run
    }

    async fn configure(
        &self,
        params: &InvocationParameters,
        run: &mut PipelineRun,
    ) -> Option<(ResolvedConfig, Option<DeploymentContext>)> {
        self.reporter.stage(Stage::Configuration);

        let store = ContextStore::new(&self.layout.context_file);
        let context = match store.load() {
            Ok(context) => context,
            Err(e) => {
                let failure = StageFailure::new(
                    FailureKind::ConfigUnresolved,
                    format!("deployment context unreadable: {}", e),
                );
                self.halt(run, Stage::Configuration, failure);
                return None;
            }
        };
        match &context {
            Some(ctx) => {
                self.reporter
                    .info(&format!("Deployment context {}", store.path().display()));
                if let Some(at) = ctx.deployed_at() {
                    self.reporter
                        .info(&format!("Infrastructure provisioned {}", at));
                }
            }
            None => self.reporter.info(&format!(
                "No deployment context at {}",
                store.path().display()
            )),
        }

        let lookup = CloudControlPlane::new(&self.executor, &self.config.cloud);
        let config = match resolve(params, context.as_ref(), &lookup).await {
            Ok(config) => config,
            Err(e) => {
                let failure = StageFailure::new(FailureKind::ConfigUnresolved, e.to_string());
                self.halt(run, Stage::Configuration, failure);
                return None;
            }
        };

        self.reporter.success(&format!(
            "Target group {} (from {})",
            config.target_group_id(),
            config.target_group_source()
        ));
        self.reporter.success(&format!(
            "Service instance {} (from {})",
            config.service_instance_id(),
            config.service_instance_source()
        ));
        info!(
            target_group = config.target_group_id(),
            service_instance = config.service_instance_id(),
            skip_build = config.skip_build(),
            configure_settings = config.configure_settings(),
            "Configuration resolved"
        );

        run.resolved = Some(config.clone());
        run.completed.push(Stage::Configuration);
        Some((config, context))
    }

    async fn prerequisites(&self, run: &mut PipelineRun) -> bool {
        self.reporter.stage(Stage::Prerequisites);
        let outcome =
            PrerequisiteValidator::new(&self.executor, &self.config.cloud, &self.config.toolchain)
                .validate(&self.reporter)
                .await;
        self.record(run, Stage::Prerequisites, outcome).is_some()
    }

    /// Route an outcome: value on success or warning, `None` after halting
    fn record<T>(&self, run: &mut PipelineRun, stage: Stage, outcome: StageOutcome<T>) -> Option<T> {
        match outcome {
            StageOutcome::Success(value) => {
                run.completed.push(stage);
                Some(value)
            }
            StageOutcome::Warning(value, warning) => {
                warn!(%stage, %warning, "Stage finished with a warning");
                run.warnings.push(warning);
                run.completed.push(stage);
                Some(value)
            }
            StageOutcome::Fatal(failure) => {
                self.halt(run, stage, failure);
                None
            }
        }
    }

    fn halt(&self, run: &mut PipelineRun, stage: Stage, failure: StageFailure) {
        let mut lines = failure.reason.lines();
        let headline = lines.next().unwrap_or_default();
        for detail in lines {
            self.reporter.info(detail);
        }
        self.reporter.error(&format!(
            "{} failed [{}]: {}; {}",
            stage,
            failure.kind,
            headline,
            failure.hint()
        ));

        if let Some(archive) = run.leftover_archive() {
            self.reporter
                .info(&format!("Archive left in place at {}", archive.display()));
        }
        warn!(%stage, kind = %failure.kind, "Pipeline halted");
        run.halted = Some(Halt { stage, failure });
    }

    fn summarize(&self, config: &ResolvedConfig) -> DeploymentSummary {
        let service_instance_id = config.service_instance_id();
        DeploymentSummary {
            target_group_id: config.target_group_id().to_string(),
            service_instance_id: service_instance_id.to_string(),
            app_url: self.config.service_url(service_instance_id, "Index"),
            swagger_url: self.config.service_url(service_instance_id, "swagger"),
        }
    }
}
