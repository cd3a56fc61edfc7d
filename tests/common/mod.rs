#![allow(dead_code)]

use std::sync::Arc;

use chargeops_gateway::config::GatewayConfig;
use chargeops_gateway::gateway::{ApiGatewayClient, RecordingNavigator};
use chargeops_gateway::session::MemorySessionStore;
use chargeops_gateway::tenant::{Branding, HostSource, ResolvedHost, TenantContext, TenantInfo};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const VALIDATE_PATH: &str = "/api/tenant/validate-domain/";

/// Gateway config that sends every request to the mock backend while the
/// tenant host is still carried in the `domain` argument.
pub fn config_for(server: &MockServer) -> GatewayConfig {
    GatewayConfig {
        origin_override: Some(server.uri()),
        ..GatewayConfig::default()
    }
}

pub fn valid_tenant_body(tenant_id: i64, name: &str) -> Value {
    json!({
        "is_valid": true,
        "tenant_id": tenant_id,
        "name": name,
        "schema_name": name.to_lowercase().replace(' ', "_"),
        "is_active": true,
        "logo": "",
        "unfold_site_title": format!("{} Ops", name),
        "unfold_site_header": name,
    })
}

pub async fn mount_valid_tenant(server: &MockServer, domain: &str, tenant_id: i64, name: &str) {
    Mock::given(method("GET"))
        .and(path(VALIDATE_PATH))
        .and(query_param("domain", domain))
        .respond_with(ResponseTemplate::new(200).set_body_json(valid_tenant_body(tenant_id, name)))
        .mount(server)
        .await;
}

pub fn tenant_context(host: &str, tenant_id: i64) -> TenantContext {
    TenantContext::new(
        ResolvedHost {
            host: host.to_string(),
            source: HostSource::Location,
        },
        TenantInfo {
            tenant_id,
            name: "Test Tenant".to_string(),
            schema_name: "test_tenant".to_string(),
            is_active: true,
            branding: Branding::default(),
        },
    )
}

pub struct Harness {
    pub store: Arc<MemorySessionStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub client: ApiGatewayClient,
}

/// Gateway client bound to `host`, talking to the mock backend
pub fn gateway(server: &MockServer, host: &str) -> Harness {
    let store = Arc::new(MemorySessionStore::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiGatewayClient::new(
        &tenant_context(host, 1),
        store.clone(),
        navigator.clone(),
        config_for(server),
    )
    .expect("gateway client");

    Harness {
        store,
        navigator,
        client,
    }
}
