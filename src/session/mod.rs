//! Client-side persisted session state: the bearer credential and the
//! tenant selection. Injected into both the tenant resolver and the gateway
//! client so neither touches ambient storage.

pub mod file;
pub mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tenant::TenantContext;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session store lock poisoned")]
    Poisoned,
}

/// Tenant selection saved for one location origin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OriginState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_context: Option<TenantContext>,
}

impl OriginState {
    fn is_empty(&self) -> bool {
        self.tenant_domain.is_none() && self.tenant_id.is_none() && self.tenant_context.is_none()
    }
}

/// Everything a store persists. Field names are the storage keys.
///
/// Tenant keys live under the origin of the location that wrote them, the
/// way browser storage is partitioned, so one location's selection never
/// leaks into another's resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub origins: BTreeMap<String, OriginState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn origin(&self, origin: &str) -> Option<&OriginState> {
        self.origins.get(origin)
    }

    fn origin_mut(&mut self, origin: &str) -> &mut OriginState {
        self.origins.entry(origin.to_string()).or_default()
    }

    fn prune(&mut self, origin: &str) {
        if self.origins.get(origin).is_some_and(OriginState::is_empty) {
            self.origins.remove(origin);
        }
    }
}

/// Key-value session storage with get/set/clear semantics. No TTL, no encryption.
///
/// Implementors provide `load` and `update`; the typed accessors are shared.
/// Tenant accessors take the origin (`Location::origin`) they are scoped to.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<SessionState, StoreError>;

    /// Apply `apply` to the stored state atomically with respect to other
    /// callers of the same store.
    fn update(&self, apply: &mut dyn FnMut(&mut SessionState)) -> Result<(), StoreError>;

    /// Stored bearer token. An empty string counts as no token.
    fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.auth_token.filter(|t| !t.is_empty()))
    }

    fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.update(&mut |state: &mut SessionState| state.auth_token = Some(token.to_string()))
    }

    fn clear_token(&self) -> Result<(), StoreError> {
        self.update(&mut |state: &mut SessionState| state.auth_token = None)
    }

    fn tenant_domain(&self, origin: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .load()?
            .origin(origin)
            .and_then(|o| o.tenant_domain.clone())
            .filter(|d| !d.is_empty()))
    }

    fn set_tenant_domain(&self, origin: &str, domain: &str) -> Result<(), StoreError> {
        self.update(&mut |state: &mut SessionState| {
            state.origin_mut(origin).tenant_domain = Some(domain.to_string())
        })
    }

    fn clear_tenant_domain(&self, origin: &str) -> Result<(), StoreError> {
        self.update(&mut |state: &mut SessionState| {
            state.origin_mut(origin).tenant_domain = None;
            state.prune(origin);
        })
    }

    fn tenant_id(&self, origin: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.load()?.origin(origin).and_then(|o| o.tenant_id))
    }

    fn set_tenant_id(&self, origin: &str, tenant_id: i64) -> Result<(), StoreError> {
        self.update(&mut |state: &mut SessionState| state.origin_mut(origin).tenant_id = Some(tenant_id))
    }

    fn tenant_context(&self, origin: &str) -> Result<Option<TenantContext>, StoreError> {
        Ok(self.load()?.origin(origin).and_then(|o| o.tenant_context.clone()))
    }

    fn set_tenant_context(&self, origin: &str, context: &TenantContext) -> Result<(), StoreError> {
        self.update(&mut |state: &mut SessionState| {
            state.origin_mut(origin).tenant_context = Some(context.clone())
        })
    }

    fn clear_tenant_context(&self, origin: &str) -> Result<(), StoreError> {
        self.update(&mut |state: &mut SessionState| {
            state.origin_mut(origin).tenant_context = None;
            state.prune(origin);
        })
    }
}
