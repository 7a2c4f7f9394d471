use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use deploy_config::InvocationParameters;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

mod commands;

#[derive(Parser)]
#[command(name = "webapp-deploy")]
#[command(about = "Build, package and deploy a web application to its hosting platform")]
#[command(version)]
struct Cli {
    /// Pipeline settings file, relative to the project root
    #[arg(short, long, global = true, default_value = "deploy.yaml")]
    config: PathBuf,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Print debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TargetArgs {
    /// Target group holding the service (overrides the deployment context)
    #[arg(long)]
    target_group: Option<String>,

    /// Service instance to deploy to (overrides the deployment context)
    #[arg(long)]
    service_instance: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, package, upload and optionally configure the service
    Deploy {
        #[command(flatten)]
        target: TargetArgs,

        /// Reuse the existing build output instead of building
        #[arg(long)]
        skip_build: bool,

        /// Apply identity and database settings after upload
        #[arg(long)]
        configure_settings: bool,
    },

    /// Resolve configuration and check prerequisites without deploying
    Check {
        #[command(flatten)]
        target: TargetArgs,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = match cli.project_root {
        Some(root) => std::path::absolute(&root)
            .with_context(|| format!("Failed to resolve project root {}", root.display()))?,
        None => std::env::current_dir().context("Failed to determine the current directory")?,
    };
    let config_path = root.join(&cli.config);

    smol::block_on(async {
        let code = match cli.command {
            Commands::Deploy {
                target,
                skip_build,
                configure_settings,
            } => {
                let params = InvocationParameters {
                    target_group_id: target.target_group,
                    service_instance_id: target.service_instance,
                    skip_build,
                    configure_settings,
                };
                commands::deploy::run(&root, &config_path, &params).await?
            }
            Commands::Check { target } => {
                let params = InvocationParameters {
                    target_group_id: target.target_group,
                    service_instance_id: target.service_instance,
                    ..Default::default()
                };
                commands::check::run(&root, &config_path, &params).await?
            }
        };
        Ok::<_, anyhow::Error>(ExitCode::from(code))
    })
}
