// Request/response interceptor chain run around every gateway call.
// Single pass: no retry, backoff or queueing at this layer.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::session::SessionStore;

use super::navigator::Navigator;
use super::request::{GatewayRequest, GatewayResponse};

/// Runs synchronously before a request is sent. An error rejects the
/// request; the response chain is not consulted.
pub trait RequestInterceptor: Send + Sync {
    /// Interceptor name for logging and debugging
    fn name(&self) -> &'static str;

    fn on_request(&self, request: &mut GatewayRequest) -> Result<(), GatewayError>;
}

/// Runs after every response or failure
pub trait ResponseInterceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_response(&self, response: GatewayResponse) -> Result<GatewayResponse, GatewayError> {
        Ok(response)
    }

    fn on_error(&self, error: GatewayError) -> GatewayError {
        error
    }
}

/// Ordered interceptors owned by one gateway client
#[derive(Default)]
pub struct InterceptorChain {
    request: Vec<Box<dyn RequestInterceptor>>,
    response: Vec<Box<dyn ResponseInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bearer auth, then API prefix on requests; session expiry on responses
    pub fn standard(
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        config: &GatewayConfig,
    ) -> Self {
        Self::new()
            .with_request(BearerAuth::new(store.clone()))
            .with_request(ApiPrefix::new(&config.api_prefix))
            .with_response(SessionExpiry::new(store, navigator, &config.login_route))
    }

    pub fn with_request(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        tracing::debug!("Registered request interceptor '{}'", interceptor.name());
        self.request.push(Box::new(interceptor));
        self
    }

    pub fn with_response(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        tracing::debug!("Registered response interceptor '{}'", interceptor.name());
        self.response.push(Box::new(interceptor));
        self
    }

    pub fn apply_request(&self, request: &mut GatewayRequest) -> Result<(), GatewayError> {
        for interceptor in &self.request {
            interceptor.on_request(request).map_err(|e| {
                tracing::error!(
                    interceptor = interceptor.name(),
                    request_id = %request.id,
                    error = %e,
                    "Request interceptor rejected request"
                );
                e
            })?;
        }
        Ok(())
    }

    pub fn apply_response(
        &self,
        outcome: Result<GatewayResponse, GatewayError>,
    ) -> Result<GatewayResponse, GatewayError> {
        let mut outcome = outcome;
        for interceptor in &self.response {
            outcome = match outcome {
                Ok(response) => interceptor.on_response(response),
                Err(error) => Err(interceptor.on_error(error)),
            };
        }
        outcome
    }
}

/// Attaches `Authorization: Bearer <token>` when a credential is stored and
/// removes the header otherwise. A missing token never fails the request.
pub struct BearerAuth {
    store: Arc<dyn SessionStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl RequestInterceptor for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn on_request(&self, request: &mut GatewayRequest) -> Result<(), GatewayError> {
        match self.store.token()? {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))?;
                request.headers.insert(AUTHORIZATION, value);
            }
            None => {
                request.headers.remove(AUTHORIZATION);
            }
        }
        Ok(())
    }
}

/// Rewrites `path` so it starts with `<prefix>/`. Paths already carrying the
/// prefix are returned unchanged, so applying this twice is a no-op.
pub fn normalize_path(path: &str, prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    if path.starts_with(&format!("{}/", prefix)) {
        path
    } else {
        format!("{}{}", prefix, path)
    }
}

/// True when any path segment is `.` or `..`, literal or percent-encoded.
/// URL parsing collapses these, which would move the request outside the prefix.
pub fn has_dot_segment(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split(['/', '\\']).any(|segment| {
        let decoded = urlencoding::decode(segment)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| segment.to_string());
        matches!(decoded.as_str(), "." | "..")
    })
}

pub struct ApiPrefix {
    prefix: String,
}

impl ApiPrefix {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl RequestInterceptor for ApiPrefix {
    fn name(&self) -> &'static str {
        "api_prefix"
    }

    fn on_request(&self, request: &mut GatewayRequest) -> Result<(), GatewayError> {
        if request.path.contains("://") || has_dot_segment(&request.path) {
            return Err(GatewayError::InvalidPath(request.path.clone()));
        }

        request.path = normalize_path(&request.path, &self.prefix);
        Ok(())
    }
}

/// On 401: drop the stored credential and navigate to the login route, once
/// per 401 response. The error itself is passed on unchanged.
pub struct SessionExpiry {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl SessionExpiry {
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>, login_route: &str) -> Self {
        Self {
            store,
            navigator,
            login_route: login_route.to_string(),
        }
    }
}

impl ResponseInterceptor for SessionExpiry {
    fn name(&self) -> &'static str {
        "session_expiry"
    }

    fn on_error(&self, error: GatewayError) -> GatewayError {
        if error.is_unauthorized() {
            if let Err(e) = self.store.clear_token() {
                tracing::error!(error = %e, "Failed to clear session credential");
            }
            tracing::warn!(route = %self.login_route, "Backend rejected credential, invalidating session");
            self.navigator.navigate(&self.login_route);
        }
        error
    }
}
