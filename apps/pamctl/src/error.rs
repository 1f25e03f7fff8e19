//! Error types and exit codes

use crate::logging::redaction::{truncate, Redactor};
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication required or failed
/// - 3: Network error
/// - 4: Validation error
/// - 5: Tenant reported failure
pub type CliResult<T> = Result<T, CliError>;

/// Longest payload excerpt shown in error messages
const PAYLOAD_EXCERPT_LEN: usize = 120;

/// Failures of the login protocol and of session validation.
///
/// Every variant is terminal for the operation that produced it; nothing is
/// registered and nothing is retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Failed to start authentication: {0}")]
    StartFailed(String),

    #[error("Federated login failed: {0}")]
    FederationFailed(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Authentication challenge failed: {0}")]
    ChallengeFailed(String),

    #[error("No active session. Run 'pamctl connect <host>' first.")]
    NoSession,

    #[error("Session for {0} is no longer valid. Please run 'pamctl connect {0}' again.")]
    Expired(String),

    #[error("Credential mode not supported: {0}")]
    UnsupportedCredentialMode(String),
}

/// Which stage of an API call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never produced a readable envelope
    TransportFailure,
    /// The tenant answered with `Success = false`
    EnvelopeFailure,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::TransportFailure => write!(f, "transport failure"),
            ApiErrorKind::EnvelopeFailure => write!(f, "envelope failure"),
        }
    }
}

/// Structured record of a failed API invocation.
///
/// Built with one of the constructors and enriched with the `with_*`
/// methods before it is handed out; it is not modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
    pub call: Option<String>,
    pub payload: Option<String>,
    pub raw_response: Option<String>,
    pub cause: Option<String>,
}

impl ApiError {
    fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            occurred_at: Utc::now(),
            call: None,
            payload: None,
            raw_response: None,
            cause: None,
        }
    }

    /// Failure before a readable envelope was obtained
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::TransportFailure, message)
    }

    /// Failure reported by the tenant in the envelope
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::EnvelopeFailure, message)
    }

    pub fn with_call(mut self, call: impl Into<String>) -> Self {
        self.call = Some(call.into());
        self
    }

    pub fn with_payload(mut self, payload: Option<&str>) -> Self {
        self.payload = payload.map(str::to_string);
        self
    }

    pub fn with_raw_response(mut self, raw: Option<String>) -> Self {
        self.raw_response = raw;
        self
    }

    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// Payload excerpt safe to show: secrets masked, length capped
    pub fn payload_excerpt(&self) -> Option<String> {
        self.payload
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| truncate(&Redactor::new().redact(p), PAYLOAD_EXCERPT_LEN))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(call) = &self.call {
            write!(f, " (call: {call}")?;
            if let Some(excerpt) = self.payload_excerpt() {
                write!(f, ", payload: {excerpt}")?;
            }
            write!(f, ")")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "\n  caused by: {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("API call failed: {0}")]
    Api(#[from] ApiError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check your internet connection\n  - Verify the tenant host name is correct\n  - Try again in a few moments")]
    ConnectionFailed(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Auth(AuthError::InvalidSelection(_))
            | CliError::Auth(AuthError::UnsupportedCredentialMode(_)) => 4,
            CliError::Auth(_) => 2,
            CliError::Api(e) => match e.kind {
                ApiErrorKind::TransportFailure => 3,
                ApiErrorKind::EnvelopeFailure => 5,
            },
            CliError::Network(_) | CliError::ConnectionFailed(_) => 3,
            CliError::Validation(_) => 4,
            CliError::Config(_) | CliError::InputError(_) | CliError::Io(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Auth(AuthError::NoSession) => {
                Some("Run 'pamctl connect <host> --user <name>' to authenticate.")
            }
            CliError::Auth(AuthError::Expired(_)) => Some("Connect to the tenant again."),
            CliError::Auth(AuthError::UnsupportedCredentialMode(_)) => {
                Some("Use interactive login with --user instead.")
            }
            CliError::ConnectionFailed(_) => Some("Check your network connection and try again."),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            CliError::ConnectionFailed(e.to_string())
        } else if e.is_timeout() {
            CliError::Network("Request timed out".to_string())
        } else {
            CliError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::InputError(format!("Dialog error: {}", e))
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(e: rustyline::error::ReadlineError) -> Self {
        CliError::InputError(format!("Readline error: {}", e))
    }
}
