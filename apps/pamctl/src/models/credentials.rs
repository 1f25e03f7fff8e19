//! How the caller wants to authenticate

use crate::logging::REDACTED;
use std::fmt;

/// Credential material for a connect request
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSpec {
    /// Interactive login as `user`, answering challenges at the console
    Interactive { user: String },

    /// OAuth2 client-credentials grant (not supported)
    ClientCredentials {
        client_id: String,
        scope: String,
        secret: String,
    },

    /// Only derive the base64 `client:password` string; no network traffic
    EncodeOnly { client: String, password: String },
}

impl CredentialSpec {
    pub fn interactive(user: impl Into<String>) -> Self {
        CredentialSpec::Interactive { user: user.into() }
    }

    /// Short name of the credential mode, for messages
    pub fn mode(&self) -> &'static str {
        match self {
            CredentialSpec::Interactive { .. } => "interactive",
            CredentialSpec::ClientCredentials { .. } => "client-credentials",
            CredentialSpec::EncodeOnly { .. } => "encode-only",
        }
    }
}

impl fmt::Debug for CredentialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSpec::Interactive { user } => f
                .debug_struct("Interactive")
                .field("user", user)
                .finish(),
            CredentialSpec::ClientCredentials {
                client_id, scope, ..
            } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("scope", scope)
                .field("secret", &REDACTED)
                .finish(),
            CredentialSpec::EncodeOnly { client, .. } => f
                .debug_struct("EncodeOnly")
                .field("client", client)
                .field("password", &REDACTED)
                .finish(),
        }
    }
}
