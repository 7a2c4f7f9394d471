//! Integration tests for deploy-config

use deploy_config::{
    parser, resolve, ContextStore, DeploymentContext, InvocationParameters, NoRemoteLookup,
    ResolutionError, ValueSource,
};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_full_settings_parsing() {
    let yaml = r#"
version: "1.0"

project:
  source_dir: src/Catalog.Api
  output_dir: artifacts/publish
  archive: artifacts/catalog.zip
  context_file: .deploy/context.json

toolchain:
  program: dotnet
  configuration: Release

archiver:
  program: /usr/bin/zip

cloud:
  program: az
  platform_domain: azurewebsites.net
  deployment_name: catalog-infra
  outputs:
    service_instance: webAppName
    workload_identity_client_id: identityClientId
    database_host: sqlFqdn

settings:
  database_name: catalog
  identity_key: AZURE_CLIENT_ID
  connection_key: ConnectionStrings__Catalog
"#;

    let config = parser::parse_str(yaml).unwrap();
    assert_eq!(config.archiver.program, "/usr/bin/zip");
    assert_eq!(config.cloud.deployment_name, "catalog-infra");
    assert_eq!(config.cloud.outputs.workload_identity_client_id, "identityClientId");
    assert_eq!(config.settings.connection_key, "ConnectionStrings__Catalog");

    let layout = config.layout(Path::new("/repo"));
    assert_eq!(layout.source_dir, Path::new("/repo/src/Catalog.Api"));
    assert_eq!(layout.output_dir, Path::new("/repo/artifacts/publish"));
    assert_eq!(layout.archive_path, Path::new("/repo/artifacts/catalog.zip"));
    assert_eq!(layout.context_file, Path::new("/repo/.deploy/context.json"));
}

#[test]
fn test_settings_file_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deploy.yaml");
    std::fs::write(&path, "toolchain:\n  configuration: Debug\n").unwrap();

    let config = parser::load_or_default(&path).unwrap();
    assert_eq!(config.toolchain.configuration, "Debug");
    assert_eq!(config.toolchain.program, "dotnet");
}

#[smol_potat::test]
async fn test_context_file_drives_resolution() {
    let dir = TempDir::new().unwrap();
    let store = ContextStore::new(dir.path().join("infra/deployment-context.json"));
    store
        .save(&DeploymentContext {
            deployed_at_timestamp: Some("2026-09-30T08:00:00Z".into()),
            target_group_id: Some("rg-demo".into()),
            service_instance_id: Some("app-demo".into()),
            ..Default::default()
        })
        .unwrap();

    let context = store.load().unwrap();
    let resolved = resolve(&InvocationParameters::default(), context.as_ref(), &NoRemoteLookup)
        .await
        .unwrap();

    assert_eq!(resolved.target_group_id(), "rg-demo");
    assert_eq!(resolved.service_instance_id(), "app-demo");
    assert_eq!(resolved.target_group_source(), ValueSource::Context);
    assert!(!resolved.skip_build());
    assert!(!resolved.configure_settings());
}

#[smol_potat::test]
async fn test_nothing_to_resolve_from() {
    let dir = TempDir::new().unwrap();
    let store = ContextStore::new(dir.path().join("missing.json"));

    let context = store.load().unwrap();
    let err = resolve(&InvocationParameters::default(), context.as_ref(), &NoRemoteLookup)
        .await
        .unwrap_err();

    assert_eq!(err, ResolutionError::TargetGroupUnresolved);
}
