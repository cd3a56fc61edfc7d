use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use url::Url;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::session::SessionStore;
use crate::tenant::host::{display_origin, join_path};
use crate::tenant::TenantContext;

use super::interceptor::InterceptorChain;
use super::navigator::Navigator;
use super::request::{GatewayRequest, GatewayResponse};

/// Tenant host the client is bound to, with its computed base URL
#[derive(Debug, Clone)]
struct Binding {
    host: String,
    base_url: Url,
}

/// The one HTTP client feature code talks to the backend through.
///
/// Cheap to clone; clones share the binding and interceptor chain, so a
/// `rebind` is seen by every holder.
#[derive(Clone)]
pub struct ApiGatewayClient {
    http: reqwest::Client,
    binding: Arc<RwLock<Binding>>,
    chain: Arc<InterceptorChain>,
    config: GatewayConfig,
}

impl ApiGatewayClient {
    /// Client for a validated tenant with the standard interceptor chain
    pub fn new(
        context: &TenantContext,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        config: GatewayConfig,
    ) -> Result<Self, GatewayError> {
        let chain = InterceptorChain::standard(store, navigator, &config);
        Self::with_chain(context, chain, config)
    }

    pub fn with_chain(
        context: &TenantContext,
        chain: InterceptorChain,
        config: GatewayConfig,
    ) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let base_url = context.base_url(&config)?;
        tracing::info!(
            host = %context.host,
            base_url = %display_origin(&base_url),
            "API gateway client configured"
        );

        Ok(Self {
            http: builder.build()?,
            binding: Arc::new(RwLock::new(Binding {
                host: context.host.clone(),
                base_url,
            })),
            chain: Arc::new(chain),
            config,
        })
    }

    fn binding(&self) -> Binding {
        self.binding
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn base_url(&self) -> Url {
        self.binding().base_url
    }

    /// Tenant host requests are currently addressed for
    pub fn tenant_host(&self) -> String {
        self.binding().host
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Point the client at a different tenant without rebuilding it
    pub fn rebind(&self, context: &TenantContext) -> Result<(), GatewayError> {
        let base_url = context.base_url(&self.config)?;
        tracing::info!(
            host = %context.host,
            base_url = %display_origin(&base_url),
            "API gateway client re-bound"
        );

        let mut current = self
            .binding
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Binding {
            host: context.host.clone(),
            base_url,
        };
        Ok(())
    }

    pub async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        self.execute(request, None).await
    }

    /// Like `send`, but the transport future is dropped (aborting the HTTP
    /// call) as soon as `cancel` fires.
    pub async fn send_cancellable(
        &self,
        request: GatewayRequest,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse, GatewayError> {
        self.execute(request, Some(cancel)).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.send(GatewayRequest::get(path)).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(GatewayRequest::post(path).with_json(body)?).await?.json()
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(GatewayRequest::put(path).with_json(body)?).await?.json()
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(GatewayRequest::patch(path).with_json(body)?).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), GatewayError> {
        self.send(GatewayRequest::delete(path)).await?;
        Ok(())
    }

    async fn execute(
        &self,
        request: GatewayRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<GatewayResponse, GatewayError> {
        let span = tracing::info_span!(
            "gateway_request",
            request_id = %request.id,
            method = %request.method,
        );

        async move {
            let (request, url) = self.prepare(request)?;
            tracing::debug!(url = %url, "Sending request");

            let outcome = match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            tracing::debug!("Request cancelled");
                            Err(GatewayError::Cancelled)
                        }
                        outcome = self.transmit(&request, url) => outcome,
                    }
                }
                None => self.transmit(&request, url).await,
            };

            if let Err(e) = &outcome {
                tracing::debug!(error = %e, "Request failed");
            }
            self.chain.apply_response(outcome)
        }
        .instrument(span)
        .await
    }

    /// Run the request chain and compute the final URL, without sending
    pub fn prepare(&self, mut request: GatewayRequest) -> Result<(GatewayRequest, Url), GatewayError> {
        self.chain.apply_request(&mut request)?;
        let url = self.url_for(&request)?;
        Ok((request, url))
    }

    fn url_for(&self, request: &GatewayRequest) -> Result<Url, GatewayError> {
        let base = self.base_url();
        let mut url = join_path(&base, &request.path)?;

        // The joined URL must still sit under the API prefix once parsed
        let scope = join_path(&base, &format!("{}/", self.config.api_prefix.trim_end_matches('/')))?;
        if !url.path().starts_with(scope.path()) {
            return Err(GatewayError::InvalidPath(request.path.clone()));
        }

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    async fn transmit(&self, request: &GatewayRequest, url: Url) -> Result<GatewayResponse, GatewayError> {
        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Response received");

        if !status.is_success() {
            return Err(GatewayError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(GatewayResponse { status, headers, body })
    }
}
