pub mod host;
pub mod resolver;

pub use host::{base_url_for, is_local_dev_host};
pub use resolver::TenantResolver;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Query parameter that overrides hostname-based tenant resolution
pub const TENANT_DOMAIN_PARAM: &str = "tenant_domain";

/// The URL the console is currently operating at (the browser location of
/// the original dashboard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Parse a location. A bare hostname such as `admin.example.com` is
    /// accepted and treated as `https://admin.example.com/`.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let input = input.trim();
        let url = if input.contains("://") {
            Url::parse(input)?
        } else {
            Url::parse(&format!("https://{}", input))?
        };
        Ok(Self { url })
    }

    pub fn from_url(url: Url) -> Self {
        Self { url }
    }

    /// Hostname without port; empty when the URL has no host
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// `scheme://host[:port]`, the key persisted tenant selection is stored under
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Where a resolved host came from, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSource {
    QueryParameter,
    StoredOverride,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    pub host: String,
    pub source: HostSource,
}

impl ResolvedHost {
    pub fn is_override(&self) -> bool {
        self.source != HostSource::Location
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub logo: String,
    pub site_title: String,
    pub site_header: String,
}

/// Tenant metadata returned by a successful domain validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantInfo {
    pub tenant_id: i64,
    pub name: String,
    pub schema_name: String,
    pub is_active: bool,
    pub branding: Branding,
}

/// Wire shape of `GET /api/tenant/validate-domain/`. Only `is_valid` is
/// guaranteed; the rest is absent on rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateDomainResponse {
    pub is_valid: bool,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub unfold_site_title: Option<String>,
    #[serde(default)]
    pub unfold_site_header: Option<String>,
}

impl ValidateDomainResponse {
    /// Tenant metadata, or `None` when the backend rejected the domain
    pub fn into_tenant_info(self) -> Option<TenantInfo> {
        if !self.is_valid {
            return None;
        }

        Some(TenantInfo {
            tenant_id: self.tenant_id?,
            name: self.name.unwrap_or_default(),
            schema_name: self.schema_name.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(false),
            branding: Branding {
                logo: self.logo.unwrap_or_default(),
                site_title: self.unfold_site_title.unwrap_or_default(),
                site_header: self.unfold_site_header.unwrap_or_default(),
            },
        })
    }
}

/// A host that passed validation, cached in the session store between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantContext {
    pub host: String,
    pub source: HostSource,
    pub info: TenantInfo,
    pub validated_at: DateTime<Utc>,
}

impl TenantContext {
    pub fn new(resolved: ResolvedHost, info: TenantInfo) -> Self {
        Self {
            host: resolved.host,
            source: resolved.source,
            info,
            validated_at: Utc::now(),
        }
    }

    /// Base URL derived from the host on every call, never cached
    pub fn base_url(&self, config: &GatewayConfig) -> Result<Url, GatewayError> {
        base_url_for(&self.host, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_parse() {
        let location = Location::parse("https://admin.example.com/dashboard?tenant_domain=acme.example.com").unwrap();
        assert_eq!(location.hostname(), "admin.example.com");
        assert_eq!(location.query_param(TENANT_DOMAIN_PARAM).as_deref(), Some("acme.example.com"));

        let bare = Location::parse("shop1.localhost").unwrap();
        assert_eq!(bare.hostname(), "shop1.localhost");
        assert_eq!(bare.query_param(TENANT_DOMAIN_PARAM), None);

        let with_port = Location::parse("http://localhost:5173/login").unwrap();
        assert_eq!(with_port.hostname(), "localhost");
        assert_eq!(with_port.origin(), "http://localhost:5173");
        assert_eq!(bare.origin(), "https://shop1.localhost");
    }

    #[test]
    fn test_validate_response_success() {
        let response: ValidateDomainResponse = serde_json::from_value(json!({
            "is_valid": true,
            "tenant_id": 12,
            "name": "Acme Charging",
            "schema_name": "acme",
            "is_active": true,
            "logo": "https://cdn.example.com/acme.png",
            "unfold_site_title": "Acme Ops",
            "unfold_site_header": "Acme"
        }))
        .unwrap();

        let info = response.into_tenant_info().unwrap();
        assert_eq!(info.tenant_id, 12);
        assert_eq!(info.schema_name, "acme");
        assert!(info.is_active);
        assert_eq!(info.branding.site_title, "Acme Ops");
        assert_eq!(info.branding.site_header, "Acme");
    }

    #[test]
    fn test_validate_response_rejected() {
        let response: ValidateDomainResponse =
            serde_json::from_value(json!({ "is_valid": false })).unwrap();
        assert!(response.into_tenant_info().is_none());

        // Valid without an id is not usable
        let response: ValidateDomainResponse =
            serde_json::from_value(json!({ "is_valid": true, "name": "x" })).unwrap();
        assert!(response.into_tenant_info().is_none());
    }
}
