//! pamctl library
//!
//! Session management and authenticated API invocation for identity and
//! privileged-access tenants. The `pamctl` binary is a thin CLI over these
//! modules.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod extensions;
pub mod federation;
pub mod interactive;
pub mod logging;
pub mod models;
pub mod output;
pub mod repl;
pub mod session;

pub use context::TenantContext;
pub use error::{ApiError, AuthError, CliError, CliResult};
