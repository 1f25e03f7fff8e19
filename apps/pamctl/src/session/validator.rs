//! Time-boxed session re-validation

use crate::api::TenantClient;
use crate::error::AuthError;
use crate::models::Session;
use crate::session::SessionRegistry;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

/// Seconds a successful check stays trusted
pub const VALIDATION_WINDOW_SECS: i64 = 300;

/// Gate in front of every authenticated call
pub struct SessionValidator {
    client: Arc<TenantClient>,
    registry: Arc<SessionRegistry>,
}

impl SessionValidator {
    pub fn new(client: Arc<TenantClient>, registry: Arc<SessionRegistry>) -> Self {
        Self { client, registry }
    }

    /// Whether `session` must be re-checked at `now`
    pub fn needs_check(session: &Session, now: DateTime<Utc>) -> bool {
        match session.last_validated_at {
            Some(at) => now - at >= Duration::seconds(VALIDATION_WINDOW_SECS),
            None => true,
        }
    }

    /// Confirm the session is usable, calling the tenant at most once per window.
    ///
    /// Never re-authenticates; an expired session must be connected again.
    pub async fn ensure_valid(&self, session: Option<&mut Session>) -> Result<(), AuthError> {
        let session = session.ok_or(AuthError::NoSession)?;

        if !session.has_bearer() {
            tracing::warn!(host = %session.host, "session carries no bearer credential");
            return Err(AuthError::Expired(session.host.clone()));
        }

        let now = Utc::now();
        if !Self::needs_check(session, now) {
            tracing::trace!(host = %session.host, "session validated recently, skipping check");
            return Ok(());
        }

        let url = self.client.config().user_info_url(&session.host);
        tracing::debug!(host = %session.host, "validating session");

        match self
            .client
            .post_envelope::<_, Value>(&url, &json!({}), Some(session))
            .await
        {
            Ok(_) => {
                session.last_validated_at = Some(now);
                if !self.registry.mark_validated(session, now) {
                    tracing::debug!(host = %session.host, "checked session is not the registered one");
                }
                tracing::info!(host = %session.host, "session validated");
                Ok(())
            }
            Err(failure) => {
                tracing::warn!(host = %session.host, error = %failure, "session validation failed");
                Err(AuthError::Expired(session.host.clone()))
            }
        }
    }
}
