//! Shared handles for one CLI process

use crate::api::{ApiInvoker, TenantClient};
use crate::auth::Authenticator;
use crate::config::Config;
use crate::error::CliResult;
use crate::federation::SamlBrowser;
use crate::interactive::Console;
use crate::session::{SessionRegistry, SessionValidator};
use std::sync::Arc;

/// One HTTP client and one session registry, handed to every component
#[derive(Clone)]
pub struct TenantContext {
    pub client: Arc<TenantClient>,
    pub registry: Arc<SessionRegistry>,
}

impl TenantContext {
    pub fn new(config: Config) -> CliResult<Self> {
        Ok(Self {
            client: Arc::new(TenantClient::new(config)?),
            registry: Arc::new(SessionRegistry::new()),
        })
    }

    pub fn config(&self) -> &Config {
        self.client.config()
    }

    pub fn authenticator<'a>(
        &self,
        console: &'a dyn Console,
        browser: &'a dyn SamlBrowser,
    ) -> Authenticator<'a> {
        Authenticator::new(
            Arc::clone(&self.client),
            Arc::clone(&self.registry),
            console,
            browser,
        )
    }

    pub fn validator(&self) -> SessionValidator {
        SessionValidator::new(Arc::clone(&self.client), Arc::clone(&self.registry))
    }

    pub fn invoker(&self) -> ApiInvoker {
        ApiInvoker::new(Arc::clone(&self.client), Arc::clone(&self.registry))
    }
}
