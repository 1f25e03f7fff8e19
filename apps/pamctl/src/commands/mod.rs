//! CLI command implementations

pub mod connect;
pub mod encode_secret;
pub mod invoke;
pub mod shell;

use pamctl::config::{Config, ConfigPaths};
use pamctl::error::CliResult;
use pamctl::TenantContext;

/// Load configuration and build the process-wide context
pub(crate) fn load_context() -> CliResult<(ConfigPaths, TenantContext)> {
    let paths = ConfigPaths::new()?;
    let config = Config::load(&paths)?;
    tracing::debug!(config_file = %paths.config_file.display(), "configuration loaded");
    let context = TenantContext::new(config)?;
    Ok((paths, context))
}

/// Host from the argument, else the configured default
pub(crate) fn resolve_host(host: Option<String>, config: &Config) -> CliResult<String> {
    host.or_else(|| config.default_host.clone())
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| {
            pamctl::CliError::Validation(
                "No host given and no default_host configured".to_string(),
            )
        })
}
