//! Runs the `webapp-deploy` binary as an operator would

mod common;
use common::CliTestContext;

#[test]
fn test_help_lists_subcommands() {
    let ctx = CliTestContext::new();
    let output = ctx.run(&["--help"]);
    output
        .assert_success()
        .assert_contains("deploy")
        .assert_contains("check");
}

#[test]
fn test_deploy_help_lists_flags() {
    let ctx = CliTestContext::new();
    ctx.run(&["deploy", "--help"])
        .assert_success()
        .assert_contains("--target-group")
        .assert_contains("--service-instance")
        .assert_contains("--skip-build")
        .assert_contains("--configure-settings");
}

#[test]
fn test_nothing_to_resolve_from_exits_one() {
    let ctx = CliTestContext::new();
    ctx.run(&["deploy"])
        .assert_exit_code(1)
        .assert_contains("configuration failed [ConfigUnresolved]: target group unresolved")
        .assert_not_contains("Building application");
}

#[test]
fn test_missing_cloud_cli_is_authentication_missing() {
    let ctx = CliTestContext::new();
    ctx.run(&["deploy", "--target-group", "rg-demo", "--service-instance", "app-demo"])
        .assert_exit_code(1)
        .assert_contains("Target group rg-demo (from parameter)")
        .assert_contains("prerequisites failed [AuthenticationMissing]")
        .assert_contains("run authentication first");
}

#[test]
fn test_check_reads_deployment_context() {
    let ctx = CliTestContext::new();
    ctx.write(
        "infra/deployment-context.json",
        r#"{"targetGroupId": "rg-demo", "serviceInstanceId": "app-demo"}"#,
    );

    ctx.run(&["check"])
        .assert_exit_code(1)
        .assert_contains("Service instance app-demo (from deployment context)")
        .assert_contains("AuthenticationMissing");
}

#[test]
fn test_malformed_context_exits_one() {
    let ctx = CliTestContext::new();
    ctx.write("infra/deployment-context.json", "[1, 2");

    ctx.run(&["deploy"])
        .assert_exit_code(1)
        .assert_contains("deployment context unreadable");
}

#[test]
fn test_invalid_settings_file_exits_one() {
    let ctx = CliTestContext::new();
    ctx.write("deploy.yaml", "project:\n  output_dir: out\n  archive: out/app.zip\n");

    ctx.run(&["deploy", "--target-group", "rg", "--service-instance", "app"])
        .assert_exit_code(1)
        .assert_contains("Failed to load pipeline settings");
}

#[test]
fn test_settings_file_can_be_relocated() {
    let ctx = CliTestContext::new();
    ctx.write("ops/pipeline.yaml", "project:\n  context_file: ops/context.json\n");
    ctx.write(
        "ops/context.json",
        r#"{"targetGroupId": "rg-ops", "serviceInstanceId": "app-ops"}"#,
    );

    ctx.run(&["check", "--config", "ops/pipeline.yaml"])
        .assert_exit_code(1)
        .assert_contains("Target group rg-ops (from deployment context)");
}
