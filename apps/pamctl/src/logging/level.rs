//! Verbosity selected by `--verbose`, `--debug` and `--trace`

/// How much of a login or call is written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Warnings only: failed validations and API calls
    #[default]
    Quiet,
    /// `pamctl=info`: login start, session registration, each invocation
    Steps,
    /// `pamctl=debug`: state transitions and every HTTP exchange
    Exchanges,
    /// `pamctl=trace`: redacted response bodies as well
    Bodies,
}

impl LogLevel {
    /// The most detailed flag wins
    pub fn from_flags(verbose: bool, debug: bool, trace: bool) -> Self {
        match (verbose, debug, trace) {
            (_, _, true) => Self::Bodies,
            (_, true, _) => Self::Exchanges,
            (true, _, _) => Self::Steps,
            _ => Self::Quiet,
        }
    }

    /// Default `EnvFilter` directive; `RUST_LOG` replaces it entirely
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Steps => "warn,pamctl=info",
            Self::Exchanges => "info,pamctl=debug",
            Self::Bodies => "debug,pamctl=trace",
        }
    }

    /// Module targets are printed once HTTP exchanges are shown
    pub fn shows_targets(&self) -> bool {
        *self >= Self::Exchanges
    }
}
