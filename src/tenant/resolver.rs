use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::GatewayConfig;
use crate::error::{BootstrapError, GatewayError};
use crate::session::{SessionStore, StoreError};

use super::host::{base_url_for, join_path};
use super::{
    HostSource, Location, ResolvedHost, TenantContext, TenantInfo, ValidateDomainResponse,
    TENANT_DOMAIN_PARAM,
};

/// Decides which tenant the console talks to and confirms it with the backend.
///
/// Validation uses its own plain HTTP client: the gateway's base URL depends
/// on validation having succeeded first.
pub struct TenantResolver {
    store: Arc<dyn SessionStore>,
    config: GatewayConfig,
    http: reqwest::Client,
}

impl TenantResolver {
    pub fn new(store: Arc<dyn SessionStore>, config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            store,
            config,
            http: builder.build()?,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Pick the tenant host: `?tenant_domain=` (persisted), then the override
    /// stored for this location's origin, then the location hostname verbatim.
    /// No validation happens here; only store I/O can fail.
    pub fn resolve_host(&self, location: &Location) -> Result<ResolvedHost, StoreError> {
        let origin = location.origin();

        if let Some(domain) = location
            .query_param(TENANT_DOMAIN_PARAM)
            .filter(|d| !d.is_empty())
        {
            self.store.set_tenant_domain(&origin, &domain)?;
            tracing::debug!(host = %domain, origin = %origin, "Tenant host from query parameter");
            return Ok(ResolvedHost {
                host: domain,
                source: HostSource::QueryParameter,
            });
        }

        if let Some(domain) = self.store.tenant_domain(&origin)? {
            tracing::debug!(host = %domain, origin = %origin, "Tenant host from stored override");
            return Ok(ResolvedHost {
                host: domain,
                source: HostSource::StoredOverride,
            });
        }

        let host = location.hostname().to_string();
        tracing::debug!(host = %host, "Tenant host from location");
        Ok(ResolvedHost {
            host,
            source: HostSource::Location,
        })
    }

    /// `<base>/api/tenant/validate-domain/?domain=<host>`, addressed with the
    /// same host rule the gateway uses
    pub fn validation_url(&self, host: &str) -> Result<Url, GatewayError> {
        let base = base_url_for(host, &self.config)?;
        let mut url = join_path(&base, &self.config.validation_path())?;
        url.query_pairs_mut().append_pair("domain", host);
        Ok(url)
    }

    /// Ask the backend whether `host` is a known tenant.
    ///
    /// On success the tenant id and domain are persisted under the origin of
    /// `location`. On any failure the store is left untouched.
    pub async fn try_validate_domain(
        &self,
        location: &Location,
        host: &str,
    ) -> Result<TenantInfo, GatewayError> {
        let info = self.fetch_tenant(host).await?;
        self.persist_tenant(&location.origin(), host, &info)?;
        Ok(info)
    }

    /// Tenant metadata, or `None` if the domain could not be validated for
    /// any reason. `None` means "cannot proceed", never "use defaults".
    pub async fn validate_domain(&self, location: &Location, host: &str) -> Option<TenantInfo> {
        match self.try_validate_domain(location, host).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "Tenant domain validation failed");
                None
            }
        }
    }

    /// Resolve and validate, reusing the cached context when it was
    /// validated for the same host.
    pub async fn load_context(&self, location: &Location) -> Result<TenantContext, BootstrapError> {
        let origin = location.origin();
        let resolved = self.resolve_host(location)?;

        if let Some(cached) = self.store.tenant_context(&origin)? {
            if cached.host == resolved.host {
                tracing::debug!(host = %cached.host, "Reusing cached tenant context");
                return Ok(TenantContext {
                    source: resolved.source,
                    ..cached
                });
            }
            tracing::info!(
                cached = %cached.host,
                resolved = %resolved.host,
                "Tenant host changed, re-validating"
            );
        }

        self.validate_context(&origin, resolved).await
    }

    /// Resolve and always re-validate, replacing any cached context
    pub async fn refresh_context(&self, location: &Location) -> Result<TenantContext, BootstrapError> {
        let resolved = self.resolve_host(location)?;
        self.validate_context(&location.origin(), resolved).await
    }

    pub fn cached_context(&self, location: &Location) -> Result<Option<TenantContext>, StoreError> {
        self.store.tenant_context(&location.origin())
    }

    async fn fetch_tenant(&self, host: &str) -> Result<TenantInfo, GatewayError> {
        let url = self.validation_url(host)?;
        tracing::info!(host = %host, url = %url, "Validating tenant domain");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        let payload: ValidateDomainResponse = response.json().await?;
        payload
            .into_tenant_info()
            .ok_or_else(|| GatewayError::TenantRejected(host.to_string()))
    }

    fn persist_tenant(&self, origin: &str, host: &str, info: &TenantInfo) -> Result<(), StoreError> {
        self.store.set_tenant_id(origin, info.tenant_id)?;
        self.store.set_tenant_domain(origin, host)?;

        tracing::info!(
            host = %host,
            tenant_id = info.tenant_id,
            schema = %info.schema_name,
            "Tenant domain validated"
        );
        Ok(())
    }

    // Nothing is persisted unless the tenant is both valid and active
    async fn validate_context(
        &self,
        origin: &str,
        resolved: ResolvedHost,
    ) -> Result<TenantContext, BootstrapError> {
        let host = resolved.host.clone();

        match self.fetch_tenant(&host).await {
            Ok(info) if info.is_active => {
                self.persist_tenant(origin, &host, &info)?;
                let context = TenantContext::new(resolved, info);
                self.store.set_tenant_context(origin, &context)?;
                Ok(context)
            }
            Ok(_) => {
                tracing::warn!(host = %host, "Tenant is inactive");
                Err(BootstrapError::TenantUnavailable {
                    source: GatewayError::TenantRejected(host.clone()),
                    host,
                })
            }
            Err(source) => {
                tracing::warn!(host = %host, error = %source, "Tenant domain validation failed");
                Err(BootstrapError::TenantUnavailable { host, source })
            }
        }
    }
}
