use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::GatewayError;

/// An outgoing gateway call before interception. `path` is tenant-relative
/// (`/chargers/`); the request chain adds the API prefix and credentials.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl GatewayRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self, GatewayError> {
        self.headers.insert(name, HeaderValue::from_str(value)?);
        Ok(self)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, GatewayError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// A 2xx response with its body already read
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl GatewayResponse {
    /// Decode the body as JSON. An empty body (e.g. 204) decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let request = GatewayRequest::get("/chargers/")
            .with_query("page", "2")
            .with_query("status", "available");

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/chargers/");
        assert_eq!(request.query.len(), 2);
        assert!(request.body.is_none());
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_requests_get_distinct_ids() {
        assert_ne!(GatewayRequest::get("/a/").id, GatewayRequest::get("/a/").id);
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let response = GatewayResponse {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: Vec::new(),
        };
        assert_eq!(response.json::<Value>().unwrap(), Value::Null);
        assert_eq!(response.json::<Option<i32>>().unwrap(), None);
    }

    #[test]
    fn test_json_body() {
        let request = GatewayRequest::post("/chargers/")
            .with_json(&json!({ "name": "CP-01" }))
            .unwrap();
        assert_eq!(request.body, Some(json!({ "name": "CP-01" })));
    }
}
