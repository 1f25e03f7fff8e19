//! Logging setup for pamctl
//!
//! Diagnostics go through `tracing` to stderr. The verbosity flags pick the
//! default filter; `RUST_LOG` overrides it. Anything that may carry a secret
//! is passed through [`Redactor`] before it is logged or shown.

pub mod level;
pub mod redaction;

pub use level::LogLevel;
pub use redaction::{Redactor, REDACTED};

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(level.shows_targets())
        .try_init();
}
