//! Tenant login: credential modes and the challenge state machine

mod authenticator;
mod state;

pub use authenticator::Authenticator;
pub use state::AuthState;

use crate::error::AuthError;
use crate::models::Session;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Outcome of a connect request
#[derive(Debug, Clone)]
pub enum Connected {
    /// A registered, authenticated session
    Session(Session),
    /// `EncodeOnly` output; nothing was contacted
    EncodedSecret(String),
}

/// Base64 (standard, padded) of `client:password`
pub fn encode_client_secret(client: &str, password: &str) -> String {
    STANDARD.encode(format!("{client}:{password}"))
}

/// Map a 1-based reply to a 0-based index; empty input picks the first option
pub fn parse_selection(reply: Option<&str>, count: usize) -> Result<usize, AuthError> {
    let reply = reply.map(str::trim).unwrap_or_default();
    if reply.is_empty() {
        return if count > 0 {
            Ok(0)
        } else {
            Err(AuthError::InvalidSelection("no options available".to_string()))
        };
    }

    match reply.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        Ok(n) => Err(AuthError::InvalidSelection(format!(
            "{n} is not between 1 and {count}"
        ))),
        Err(_) => Err(AuthError::InvalidSelection(format!(
            "'{reply}' is not a number"
        ))),
    }
}
