//! # Deploy Pipeline
//!
//! Moves a project from "source built" to "service running with correct
//! settings" through a fixed sequence of stages:
//!
//! ```text
//! configuration -> prerequisites -> build -> package -> deploy -> settings -> cleanup
//! ```
//!
//! Every stage returns a [`StageOutcome`]. The [`Pipeline`] continues on
//! success and warnings and halts on the first fatal outcome, skipping every
//! later stage including cleanup. External tools are reached only through a
//! [`CommandExecutor`](command_executor::CommandExecutor), so the whole
//! pipeline runs against a scripted executor in tests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use command_executor::LocalExecutor;
//! use deploy_config::{DeployConfig, InvocationParameters};
//! use deploy_pipeline::{ConsoleReporter, Pipeline};
//!
//! # fn main() {
//! let pipeline = Pipeline::new(
//!     LocalExecutor::new(),
//!     ConsoleReporter::new(),
//!     DeployConfig::default(),
//!     std::path::Path::new("/work/repo"),
//! );
//! let run = smol::block_on(pipeline.run(&InvocationParameters::default()));
//! std::process::exit(run.exit_code());
//! # }
//! ```

#![warn(missing_docs)]

mod artifact;
mod cloud;
mod orchestrator;
mod outcome;
mod report;
pub mod stages;

pub use artifact::{format_size, Artifact};
pub use cloud::CloudControlPlane;
pub use orchestrator::{DeploymentSummary, Halt, Pipeline, PipelineRun};
pub use outcome::{FailureKind, Stage, StageFailure, StageOutcome, StageWarning, WarningKind};
pub use report::{ConsoleReporter, LineKind, MemoryReporter, ReportLine, Reporter};
