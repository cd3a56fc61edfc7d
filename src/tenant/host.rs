//! Host to base-URL addressing, shared by the resolver's validation call and
//! the gateway client so the two always target the same backend.

use url::Url;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Hostname part of `host`, dropping any `:port` suffix
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((name, port))
            if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) =>
        {
            name
        }
        _ => host,
    }
}

/// `localhost` or any `*.localhost` subdomain
pub fn is_local_dev_host(host: &str) -> bool {
    let hostname = strip_port(host).trim_end_matches('.').to_ascii_lowercase();
    hostname == "localhost" || hostname.ends_with(".localhost")
}

/// Base URL for `host`: plain HTTP on the dev port for local-dev hosts,
/// HTTPS with no explicit port otherwise. Any port on `host` is dropped. A configured origin override wins.
pub fn base_url_for(host: &str, config: &GatewayConfig) -> Result<Url, GatewayError> {
    if let Some(origin) = &config.origin_override {
        return Ok(Url::parse(origin)?);
    }

    let raw = if is_local_dev_host(host) {
        format!("http://{}:{}", strip_port(host), config.dev_port)
    } else {
        format!("https://{}", strip_port(host))
    };

    Ok(Url::parse(&raw)?)
}

/// Append a path (optionally carrying a query string) to `base`, keeping any
/// path prefix the base already has.
pub fn join_path(base: &Url, path: &str) -> Result<Url, GatewayError> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    Ok(Url::parse(&format!("{}{}", base.as_str().trim_end_matches('/'), path))?)
}

/// Base URL rendered without the trailing slash `Url` adds
pub fn display_origin(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}
