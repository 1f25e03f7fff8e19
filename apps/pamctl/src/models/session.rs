//! Authenticated tenant session

use crate::logging::REDACTED;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// One authenticated relationship to a tenant host
#[derive(Clone, PartialEq)]
pub struct Session {
    /// Canonical tenant host, the registry key
    pub host: String,

    /// Authenticated principal, absent for pure bearer-token sessions
    pub user: Option<String>,

    /// Headers sent with every call on this session
    pub auth_headers: BTreeMap<String, String>,

    /// When authentication completed
    pub started_at: DateTime<Utc>,

    /// Last successful liveness check
    pub last_validated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a session carrying `Authorization: Bearer <token>`
    pub fn with_bearer(host: &str, user: Option<String>, token: &str) -> Self {
        let mut auth_headers = BTreeMap::new();
        auth_headers.insert(AUTHORIZATION_HEADER.to_string(), format!("Bearer {token}"));

        Self {
            host: canonical_host(host),
            user,
            auth_headers,
            started_at: Utc::now(),
            last_validated_at: None,
        }
    }

    /// The bearer credential, if the headers carry a non-empty one
    pub fn bearer_token(&self) -> Option<&str> {
        self.auth_headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(AUTHORIZATION_HEADER))
            .and_then(|(_, value)| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer_token().is_some()
    }

    /// Display name of the principal
    pub fn principal(&self) -> &str {
        self.user.as_deref().unwrap_or("(bearer token)")
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .auth_headers
            .keys()
            .map(|k| (k.as_str(), REDACTED))
            .collect();
        f.debug_struct("Session")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("auth_headers", &headers)
            .field("started_at", &self.started_at)
            .field("last_validated_at", &self.last_validated_at)
            .finish()
    }
}

/// Normalize a user-supplied tenant address to a bare host name
///
/// `https://ABC.id.Example.com/` becomes `abc.id.example.com`.
pub fn canonical_host(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    host.to_ascii_lowercase()
}

/// Tenant instance identifier: the first DNS label of the host
pub fn instance_id(host: &str) -> String {
    let host = canonical_host(host);
    let without_port = host.split(':').next().unwrap_or_default();
    without_port
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}
