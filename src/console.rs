use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::error::BootstrapError;
use crate::gateway::{ApiGatewayClient, Navigator};
use crate::services::{Resource, ResourceService};
use crate::session::SessionStore;
use crate::tenant::{Location, TenantContext, TenantResolver};

/// A validated tenant plus the gateway client bound to it. Only exists once
/// validation succeeded; a failed bootstrap leaves callers in the blocked state.
pub struct Console {
    resolver: TenantResolver,
    context: TenantContext,
    client: ApiGatewayClient,
}

impl Console {
    pub async fn bootstrap(
        config: GatewayConfig,
        store: Arc<dyn SessionStore>,
        location: &Location,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, BootstrapError> {
        let resolver = TenantResolver::new(store.clone(), config.clone())?;
        let context = resolver.load_context(location).await?;
        let client = ApiGatewayClient::new(&context, store, navigator, config)?;

        tracing::info!(
            host = %context.host,
            tenant = %context.info.name,
            source = ?context.source,
            "Console ready"
        );

        Ok(Self {
            resolver,
            context,
            client,
        })
    }

    pub fn context(&self) -> &TenantContext {
        &self.context
    }

    pub fn client(&self) -> &ApiGatewayClient {
        &self.client
    }

    pub fn resolver(&self) -> &TenantResolver {
        &self.resolver
    }

    pub fn resource(&self, resource: Resource) -> ResourceService {
        ResourceService::new(self.client.clone(), resource)
    }

    /// Re-resolve for a new location (e.g. a `tenant_domain` parameter added
    /// after start-up) and re-bind the existing client. On failure the
    /// current tenant stays in place.
    pub async fn switch_location(&mut self, location: &Location) -> Result<&TenantContext, BootstrapError> {
        let context = self.resolver.load_context(location).await?;
        if context.host != self.context.host {
            self.client.rebind(&context)?;
        }
        self.context = context;
        Ok(&self.context)
    }
}
