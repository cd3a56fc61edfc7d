use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::config::{self, AppConfig};
use crate::console::Console;
use crate::gateway::TerminalNavigator;
use crate::session::file::get_config_dir;
use crate::session::{FileSessionStore, SessionStore};
use crate::tenant::{Location, TenantResolver};

/// Everything a command needs: app config, the on-disk session store and
/// the location the console is pointed at.
pub struct CliContext {
    pub config: AppConfig,
    pub store: Arc<FileSessionStore>,
    pub location: Option<Location>,
}

impl CliContext {
    pub fn from_env(location: Option<&str>) -> anyhow::Result<Self> {
        let config = config::config().clone();
        let config_dir = get_config_dir(config.session.config_dir.as_deref())?;
        let store = Arc::new(FileSessionStore::in_dir(&config_dir));

        let location = location
            .map(|raw| Location::parse(raw).with_context(|| format!("invalid location '{}'", raw)))
            .transpose()?;

        tracing::debug!(store = %store.path().display(), "Using session store");

        Ok(Self {
            config,
            store,
            location,
        })
    }

    pub fn require_location(&self) -> anyhow::Result<&Location> {
        self.location
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No location set; pass --location <URL> or set CHARGEOPS_LOCATION"))
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.clone()
    }

    pub fn resolver(&self) -> anyhow::Result<TenantResolver> {
        Ok(TenantResolver::new(self.store(), self.config.gateway.clone())?)
    }

    /// Resolve, validate and build the gateway; fails while the tenant is unavailable
    pub async fn console(&self) -> anyhow::Result<Console> {
        let location = self.require_location()?;
        let console = Console::bootstrap(
            self.config.gateway.clone(),
            self.store(),
            location,
            Arc::new(TerminalNavigator),
        )
        .await?;
        Ok(console)
    }
}

/// Token cancelled on Ctrl-C so an in-flight request is aborted
pub fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Interrupt received, cancelling request");
            child.cancel();
        }
    });
    token
}
