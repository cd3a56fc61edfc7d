use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Addressing and request policy shared by the tenant resolver and the gateway client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Prefix every gateway path must start with
    pub api_prefix: String,
    /// Port used for `localhost` / `*.localhost` hosts
    pub dev_port: u16,
    /// Route navigated to when the backend answers 401
    pub login_route: String,
    /// Domain validation endpoint, relative to `api_prefix`
    pub validate_path: String,
    /// No timeout unless configured; the transport default applies
    pub request_timeout_secs: Option<u64>,
    /// Fixed origin (proxy, test backend) used instead of the host-derived base URL
    pub origin_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub config_dir: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            dev_port: 8000,
            login_route: "/login".to_string(),
            validate_path: "/tenant/validate-domain/".to_string(),
            request_timeout_secs: None,
            origin_override: None,
        }
    }
}

impl GatewayConfig {
    /// Full validation path: `validate_path` under `api_prefix`
    pub fn validation_path(&self) -> String {
        let path = self.validate_path.trim_start_matches('/');
        format!("{}/{}", self.api_prefix.trim_end_matches('/'), path)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("CHARGEOPS_API_PREFIX") {
            self.gateway.api_prefix = v;
        }
        if let Ok(v) = env::var("CHARGEOPS_DEV_PORT") {
            self.gateway.dev_port = v.parse().unwrap_or(self.gateway.dev_port);
        }
        if let Ok(v) = env::var("CHARGEOPS_LOGIN_ROUTE") {
            self.gateway.login_route = v;
        }
        if let Ok(v) = env::var("CHARGEOPS_VALIDATE_PATH") {
            self.gateway.validate_path = v;
        }
        if let Ok(v) = env::var("CHARGEOPS_REQUEST_TIMEOUT_SECS") {
            self.gateway.request_timeout_secs = v.parse().ok();
        }
        if let Ok(v) = env::var("CHARGEOPS_API_ORIGIN") {
            self.gateway.origin_override = Some(v).filter(|s| !s.trim().is_empty());
        }

        if let Ok(v) = env::var("CHARGEOPS_CONFIG_DIR") {
            self.session.config_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            gateway: GatewayConfig::default(),
            session: SessionConfig { config_dir: None },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            gateway: GatewayConfig {
                request_timeout_secs: Some(60),
                ..GatewayConfig::default()
            },
            session: SessionConfig { config_dir: None },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            gateway: GatewayConfig {
                request_timeout_secs: Some(30),
                ..GatewayConfig::default()
            },
            session: SessionConfig { config_dir: None },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.gateway.api_prefix, "/api");
        assert_eq!(config.gateway.dev_port, 8000);
        assert_eq!(config.gateway.login_route, "/login");
        assert_eq!(config.gateway.validation_path(), "/api/tenant/validate-domain/");
        assert!(config.gateway.request_timeout_secs.is_none());
        assert!(config.gateway.origin_override.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.gateway.request_timeout_secs, Some(30));
        assert_eq!(config.gateway.dev_port, 8000);
    }

    #[test]
    fn test_validation_path_follows_api_prefix() {
        let gateway = GatewayConfig {
            api_prefix: "/backend/v2/".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(gateway.validation_path(), "/backend/v2/tenant/validate-domain/");
    }
}
