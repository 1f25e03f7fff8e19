//! Persistent CLI settings and tenant endpoint URLs

use crate::config::{ConfigPaths, DEFAULT_AUTH_VERSION};
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};

const START_AUTHENTICATION_PATH: &str = "identity/Security/StartAuthentication";
const ADVANCE_AUTHENTICATION_PATH: &str = "identity/Security/AdvanceAuthentication";
const BROWSER_IDENTITY_PATH: &str = "identity/Security/BrowserIdentity";
const SIGNIN_OIDC_PATH: &str = "identity/signin-oidc";
const ASSERTION_CONSUMER_PATH: &str = "identity-federation/saml/assertion-consumer";
const USER_INFO_PATH: &str = "identity/UserMgmt/GetUserInfo";

/// CLI configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Version string sent when starting authentication
    pub auth_version: String,

    /// Redirects followed when resolving the IdP login URL
    pub max_redirects: usize,

    /// URL scheme for tenant endpoints
    pub scheme: String,

    /// Host used when a command does not name one
    pub default_host: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            auth_version: DEFAULT_AUTH_VERSION.to_string(),
            max_redirects: 10,
            scheme: "https".to_string(),
            default_host: None,
        }
    }
}

impl Config {
    /// Load config.json if present, then apply environment overrides
    pub fn load(paths: &ConfigPaths) -> CliResult<Self> {
        let config = if paths.config_file.exists() {
            let content = std::fs::read_to_string(&paths.config_file)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Save the configuration to config.json
    pub fn save(&self, paths: &ConfigPaths) -> CliResult<()> {
        paths.ensure_dir_exists()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&paths.config_file, content)?;
        Ok(())
    }

    /// Apply `PAMCTL_*` overrides read through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> CliResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PAMCTL_TIMEOUT_SECS") {
            self.timeout_secs = value.trim().parse().map_err(|_| {
                CliError::Config(format!("PAMCTL_TIMEOUT_SECS is not a number: {value}"))
            })?;
        }
        if let Some(host) = lookup("PAMCTL_DEFAULT_HOST").filter(|h| !h.trim().is_empty()) {
            self.default_host = Some(host);
        }
        if self.timeout_secs == 0 {
            return Err(CliError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(self)
    }

    /// Base URL of a tenant host
    pub fn base_url(&self, host: &str) -> String {
        format!("{}://{}", self.scheme, host)
    }

    /// URL of an arbitrary API call relative to the tenant root
    pub fn api_call_url(&self, host: &str, call: &str) -> String {
        format!("{}/{}", self.base_url(host), call.trim_start_matches('/'))
    }

    pub fn start_authentication_url(&self, host: &str) -> String {
        self.api_call_url(host, START_AUTHENTICATION_PATH)
    }

    pub fn advance_authentication_url(&self, host: &str) -> String {
        self.api_call_url(host, ADVANCE_AUTHENTICATION_PATH)
    }

    pub fn browser_identity_url(&self, host: &str) -> String {
        self.api_call_url(host, BROWSER_IDENTITY_PATH)
    }

    pub fn signin_oidc_url(&self, host: &str) -> String {
        self.api_call_url(host, SIGNIN_OIDC_PATH)
    }

    pub fn assertion_consumer_url(&self, host: &str) -> String {
        self.api_call_url(host, ASSERTION_CONSUMER_PATH)
    }

    pub fn user_info_url(&self, host: &str) -> String {
        self.api_call_url(host, USER_INFO_PATH)
    }
}
