// Gateway and tenant-resolution error types
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::session::StoreError;

/// Errors surfaced by the API gateway client and the tenant validation call.
///
/// Only a 401 `Status` triggers side effects (see `SessionExpiry`); every
/// other variant is handed back to the caller as-is.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid request path '{0}': gateway paths must be tenant-relative")]
    InvalidPath(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Domain '{0}' is not a valid tenant")]
    TenantRejected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}

impl GatewayError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(status.as_u16()),
            GatewayError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Status { status, .. } => match status.as_u16() {
                400 => "BAD_REQUEST",
                401 => "UNAUTHORIZED",
                403 => "FORBIDDEN",
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                422 => "UNPROCESSABLE_ENTITY",
                429 => "TOO_MANY_REQUESTS",
                500..=599 => "SERVER_ERROR",
                _ => "HTTP_ERROR",
            },
            GatewayError::Network(_) => "NETWORK_ERROR",
            GatewayError::Cancelled => "CANCELLED",
            GatewayError::InvalidPath(_) => "INVALID_PATH",
            GatewayError::InvalidUrl(_) => "INVALID_URL",
            GatewayError::InvalidHeader(_) => "INVALID_HEADER",
            GatewayError::TenantRejected(_) => "TENANT_REJECTED",
            GatewayError::Serialization(_) => "SERIALIZATION_ERROR",
            GatewayError::Store(_) => "STORE_ERROR",
        }
    }

    /// Convert to a JSON body for `--json` output
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.to_string(),
            "code": self.error_code(),
        });

        if let Some(status) = self.status_code() {
            response["status"] = json!(status);
        }

        response
    }
}

/// Application start-up failures. `TenantUnavailable` is the blocked state:
/// callers must not build a gateway or issue requests after it.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Tenant '{host}' could not be validated")]
    TenantUnavailable {
        host: String,
        #[source]
        source: GatewayError,
    },

    #[error("Gateway setup failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}
