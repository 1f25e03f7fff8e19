//! Configuration management for pamctl

mod paths;
mod settings;

pub use paths::ConfigPaths;
pub use settings::Config;

/// Protocol version sent with StartAuthentication
pub const DEFAULT_AUTH_VERSION: &str = "1.0";
