mod common;

use std::sync::Arc;

use anyhow::Result;
use chargeops_gateway::error::BootstrapError;
use chargeops_gateway::gateway::RecordingNavigator;
use chargeops_gateway::services::Resource;
use chargeops_gateway::session::{FileSessionStore, SessionStore};
use chargeops_gateway::tenant::Location;
use chargeops_gateway::Console;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn bootstrap_then_crud_through_resource_service() -> Result<()> {
    let server = MockServer::start().await;
    common::mount_valid_tenant(&server, "acme.example.com", 12, "Acme").await;

    Mock::given(method("GET"))
        .and(path("/api/chargers/"))
        .and(query_param("status", "available"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }, { "id": 2 }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/chargers/2/"))
        .and(body_json(json!({ "name": "CP-02" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 2, "name": "CP-02" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/ocpp/id-tags/ABC/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let store = Arc::new(FileSessionStore::in_dir(dir.path()));
    store.set_token("abc123")?;

    let console = Console::bootstrap(
        common::config_for(&server),
        store.clone(),
        &Location::parse("https://acme.example.com/dashboard")?,
        Arc::new(RecordingNavigator::new()),
    )
    .await?;
    assert_eq!(console.context().info.tenant_id, 12);

    let chargers = console.resource(Resource::Chargers);
    let listed: Vec<Value> = chargers
        .list(&[("status".to_string(), "available".to_string())])
        .await?;
    assert_eq!(listed.len(), 2);

    let updated: Value = chargers.update("2", &json!({ "name": "CP-02" })).await?;
    assert_eq!(updated["name"], "CP-02");

    console.resource(Resource::IdTags).delete("ABC").await?;

    // Persisted across a fresh store on the same directory
    let reopened = FileSessionStore::in_dir(dir.path());
    let origin = "https://acme.example.com";
    assert_eq!(reopened.tenant_id(origin)?, Some(12));
    assert_eq!(reopened.tenant_domain(origin)?.as_deref(), Some("acme.example.com"));
    assert!(reopened.tenant_context(origin)?.is_some());
    Ok(())
}

#[tokio::test]
async fn failed_validation_blocks_bootstrap() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(common::VALIDATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "is_valid": false })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chargers/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let result = Console::bootstrap(
        common::config_for(&server),
        Arc::new(FileSessionStore::in_dir(dir.path())),
        &Location::parse("https://nobody.example.com/")?,
        Arc::new(RecordingNavigator::new()),
    )
    .await;

    match result {
        Err(BootstrapError::TenantUnavailable { host, .. }) => assert_eq!(host, "nobody.example.com"),
        Err(other) => panic!("expected TenantUnavailable, got {:?}", other),
        Ok(_) => panic!("bootstrap must not succeed for a rejected domain"),
    }
    Ok(())
}

#[tokio::test]
async fn switch_location_revalidates_and_keeps_client() -> Result<()> {
    let server = MockServer::start().await;
    common::mount_valid_tenant(&server, "acme.example.com", 12, "Acme").await;
    common::mount_valid_tenant(&server, "volt.example.com", 13, "Volt").await;

    let dir = tempfile::tempdir()?;
    let mut console = Console::bootstrap(
        common::config_for(&server),
        Arc::new(FileSessionStore::in_dir(dir.path())),
        &Location::parse("https://acme.example.com/")?,
        Arc::new(RecordingNavigator::new()),
    )
    .await?;
    let client = console.client().clone();
    assert_eq!(client.tenant_host(), "acme.example.com");

    let context = console
        .switch_location(&Location::parse("https://acme.example.com/?tenant_domain=volt.example.com")?)
        .await?;
    assert_eq!(context.info.tenant_id, 13);
    assert_eq!(console.context().host, "volt.example.com");

    // The clone taken before the switch shares the new binding
    assert_eq!(client.tenant_host(), "volt.example.com");
    Ok(())
}

#[tokio::test]
async fn switch_to_unknown_tenant_keeps_current() -> Result<()> {
    let server = MockServer::start().await;
    common::mount_valid_tenant(&server, "acme.example.com", 12, "Acme").await;
    Mock::given(method("GET"))
        .and(path(common::VALIDATE_PATH))
        .and(query_param("domain", "ghost.example.com"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let mut console = Console::bootstrap(
        common::config_for(&server),
        Arc::new(FileSessionStore::in_dir(dir.path())),
        &Location::parse("https://acme.example.com/")?,
        Arc::new(RecordingNavigator::new()),
    )
    .await?;

    let result = console
        .switch_location(&Location::parse("https://acme.example.com/?tenant_domain=ghost.example.com")?)
        .await;
    assert!(matches!(result, Err(BootstrapError::TenantUnavailable { .. })));
    assert_eq!(console.context().host, "acme.example.com");
    assert_eq!(console.client().tenant_host(), "acme.example.com");
    Ok(())
}
