use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use command_executor::{Command, CommandExecutor, LocalExecutor};

#[derive(Args)]
pub struct CiArgs {
    #[command(subcommand)]
    cmd: CiCommand,
}

#[derive(Subcommand)]
pub enum CiCommand {
    /// Run all CI checks
    All,
    /// Format check (read-only)
    #[command(name = "fmt-check")]
    FmtCheck,
    /// Clippy lints
    Clippy,
    /// Cargo deny check
    Deny,
    /// Run library and binary unit tests only
    UnitTests,
    /// Run every test target, including the CLI and scenario tests
    Tests,
}

pub async fn run(args: CiArgs) -> Result<()> {
    match args.cmd {
        CiCommand::All => run_all().await,
        CiCommand::FmtCheck => run_fmt().await,
        CiCommand::Clippy => run_clippy().await,
        CiCommand::Deny => run_deny().await,
        CiCommand::UnitTests => run_tests(&["--lib", "--bins"]).await,
        CiCommand::Tests => run_tests(&["--all-targets"]).await,
    }
}

async fn run_all() -> Result<()> {
    println!("Running all CI checks\n");

    println!("Checking code formatting...");
    run_fmt().await?;
    println!("Format check passed\n");

    println!("Running clippy lints...");
    run_clippy().await?;
    println!("Clippy check passed\n");

    if cargo_deny_available().await {
        println!("Running cargo deny...");
        run_deny().await?;
        println!("Dependency check passed\n");
    }

    println!("Running tests...");
    run_tests(&["--all-targets"]).await?;
    println!("Tests passed\n");

    println!("All CI checks passed!");
    Ok(())
}

async fn run_fmt() -> Result<()> {
    if !run_cargo_command(&["fmt", "--all", "--", "--check"]).await? {
        bail!("Format check failed. Run 'cargo fmt --all' to fix.");
    }
    Ok(())
}

async fn run_clippy() -> Result<()> {
    let success = run_cargo_command(&[
        "clippy",
        "--workspace",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
    .await?;
    if !success {
        bail!("Clippy check failed");
    }
    Ok(())
}

async fn run_deny() -> Result<()> {
    if !run_cargo_command(&["deny", "check"]).await? {
        bail!("Cargo deny check failed");
    }
    Ok(())
}

async fn run_tests(extra_args: &[&str]) -> Result<()> {
    let mut args = vec!["test", "--workspace"];
    args.extend_from_slice(extra_args);

    if !run_cargo_command(&args).await? {
        bail!("Tests failed");
    }
    Ok(())
}

/// Run cargo to completion, then echo what it printed
async fn run_cargo_command(args: &[&str]) -> Result<bool> {
    let cmd = Command::builder("cargo").args(args).build();
    let output = LocalExecutor::new().execute(cmd).await?;

    print!("{}", output.stdout);
    eprint!("{}", output.stderr);
    if !output.is_success() {
        eprintln!("cargo {}: {}", args.join(" "), output.status_description());
    }
    Ok(output.is_success())
}

async fn cargo_deny_available() -> bool {
    let cmd = Command::builder("cargo").args(["deny", "--version"]).build();
    matches!(
        LocalExecutor::new().execute(cmd).await,
        Ok(output) if output.is_success()
    )
}
