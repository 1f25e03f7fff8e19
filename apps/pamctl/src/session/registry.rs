//! In-process registry of authenticated sessions

use crate::error::ApiError;
use crate::models::{canonical_host, Session};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct RegistryState {
    sessions: BTreeMap<String, Session>,
    default_host: Option<String>,
    last_error: Option<ApiError>,
}

/// Sessions keyed by canonical host, the default pointer and the last error.
///
/// Shared through `Arc`; every accessor takes the lock for the duration of a
/// copy and never across an await.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    state: Mutex<RegistryState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session unless one already exists for its host.
    ///
    /// The default pointer moves to the host either way. Returns `true` when
    /// the session was stored.
    pub fn register(&self, session: Session) -> bool {
        let mut state = self.state.lock();
        let host = session.host.clone();
        let inserted = if state.sessions.contains_key(&host) {
            tracing::debug!(host = %host, "session already registered, keeping existing");
            false
        } else {
            state.sessions.insert(host.clone(), session);
            true
        };
        state.default_host = Some(host);
        inserted
    }

    /// Session for a host, if any
    pub fn get(&self, host: &str) -> Option<Session> {
        self.state.lock().sessions.get(&canonical_host(host)).cloned()
    }

    /// Session for `host`, or the default session when no host is given
    pub fn resolve(&self, host: Option<&str>) -> Option<Session> {
        match host {
            Some(host) => self.get(host),
            None => self.default_session(),
        }
    }

    /// The session most recently connected or selected
    pub fn default_session(&self) -> Option<Session> {
        let state = self.state.lock();
        state
            .default_host
            .as_ref()
            .and_then(|host| state.sessions.get(host))
            .cloned()
    }

    pub fn default_host(&self) -> Option<String> {
        self.state.lock().default_host.clone()
    }

    /// Point the default at a registered host; returns `false` if unknown
    pub fn set_default(&self, host: &str) -> bool {
        let host = canonical_host(host);
        let mut state = self.state.lock();
        if state.sessions.contains_key(&host) {
            state.default_host = Some(host);
            true
        } else {
            false
        }
    }

    pub fn hosts(&self) -> Vec<String> {
        self.state.lock().sessions.keys().cloned().collect()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.state.lock().sessions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().sessions.is_empty()
    }

    /// Record a successful liveness check on the stored copy.
    ///
    /// Only stamps the stored session when it carries the same credential
    /// headers as `checked`; returns whether it did.
    pub fn mark_validated(&self, checked: &Session, at: DateTime<Utc>) -> bool {
        let mut state = self.state.lock();
        match state.sessions.get_mut(&canonical_host(&checked.host)) {
            Some(stored) if stored.auth_headers == checked.auth_headers => {
                stored.last_validated_at = Some(at);
                true
            }
            _ => false,
        }
    }

    /// Drop a session; clears the default pointer if it pointed there
    pub fn remove(&self, host: &str) -> Option<Session> {
        let host = canonical_host(host);
        let mut state = self.state.lock();
        let removed = state.sessions.remove(&host);
        if state.default_host.as_deref() == Some(host.as_str()) {
            state.default_host = None;
        }
        removed
    }

    /// Replace the last error
    pub fn record_error(&self, error: ApiError) {
        self.state.lock().last_error = Some(error);
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.state.lock().last_error.clone()
    }
}
