//! One service definition per backend resource, all going through the
//! gateway client. Paths are tenant-relative; the gateway adds `/api`.

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::GatewayError;
use crate::gateway::{ApiGatewayClient, GatewayRequest, GatewayResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Chargers,
    Connectors,
    ChargingSessions,
    IdTags,
    Payments,
    Wallets,
    Tenants,
    OcpiPartners,
}

impl Resource {
    /// Collection path relative to the API prefix, with trailing slash
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Chargers => "/chargers/",
            Resource::Connectors => "/ocpp/connectors/",
            Resource::ChargingSessions => "/ocpp/sessions/",
            Resource::IdTags => "/ocpp/id-tags/",
            Resource::Payments => "/payments/",
            Resource::Wallets => "/users/wallets/",
            Resource::Tenants => "/tenants/",
            Resource::OcpiPartners => "/ocpi/partners/",
        }
    }

    /// Item path with `id` percent-encoded as a single segment
    pub fn item_path(&self, id: &str) -> String {
        format!("{}{}/", self.path(), urlencoding::encode(id))
    }

    pub fn all() -> &'static [Resource] {
        &[
            Resource::Chargers,
            Resource::Connectors,
            Resource::ChargingSessions,
            Resource::IdTags,
            Resource::Payments,
            Resource::Wallets,
            Resource::Tenants,
            Resource::OcpiPartners,
        ]
    }
}

/// CRUD access to one resource. Bodies and results are generic so callers
/// pick their own typed models or use `serde_json::Value`.
#[derive(Clone)]
pub struct ResourceService {
    client: ApiGatewayClient,
    resource: Resource,
    cancel: Option<CancellationToken>,
}

impl ResourceService {
    pub fn new(client: ApiGatewayClient, resource: Resource) -> Self {
        Self {
            client,
            resource,
            cancel: None,
        }
    }

    /// Tie every call made through this service to `token`
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub async fn list<T: DeserializeOwned>(&self, query: &[(String, String)]) -> Result<T, GatewayError> {
        let mut request = GatewayRequest::get(self.resource.path());
        for (key, value) in query {
            request = request.with_query(key.as_str(), value.as_str());
        }
        self.dispatch(request).await?.json()
    }

    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<T, GatewayError> {
        self.dispatch(GatewayRequest::get(self.resource.item_path(id)))
            .await?
            .json()
    }

    pub async fn create<B, T>(&self, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = GatewayRequest::post(self.resource.path()).with_json(body)?;
        self.dispatch(request).await?.json()
    }

    /// Partial update (PATCH)
    pub async fn update<B, T>(&self, id: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = GatewayRequest::patch(self.resource.item_path(id)).with_json(body)?;
        self.dispatch(request).await?.json()
    }

    /// Full replacement (PUT)
    pub async fn replace<B, T>(&self, id: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = GatewayRequest::put(self.resource.item_path(id)).with_json(body)?;
        self.dispatch(request).await?.json()
    }

    pub async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        self.dispatch(GatewayRequest::delete(self.resource.item_path(id)))
            .await?;
        Ok(())
    }

    async fn dispatch(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        tracing::debug!(resource = ?self.resource, path = %request.path, "Resource request");
        match &self.cancel {
            Some(token) => self.client.send_cancellable(request, token).await,
            None => self.client.send(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_tenant_relative() {
        for resource in Resource::all() {
            let path = resource.path();
            assert!(path.starts_with('/') && path.ends_with('/'));
            assert!(!path.starts_with("/api/"), "{:?} already carries the prefix", resource);
        }
    }

    #[test]
    fn test_item_path() {
        assert_eq!(Resource::Chargers.item_path("42"), "/chargers/42/");
        assert_eq!(Resource::Wallets.item_path("7"), "/users/wallets/7/");
        assert_eq!(Resource::IdTags.item_path("ABC 01/x"), "/ocpp/id-tags/ABC%2001%2Fx/");
        // Dot ids stay literal and are refused by the gateway
        assert_eq!(Resource::Chargers.item_path(".."), "/chargers/../");
    }
}
