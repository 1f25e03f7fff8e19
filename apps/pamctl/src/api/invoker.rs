//! Validated, authenticated generic API calls

use crate::api::{CallFailure, TenantClient};
use crate::error::{ApiError, AuthError, CliResult};
use crate::models::Session;
use crate::session::{SessionRegistry, SessionValidator};
use serde_json::Value;
use std::sync::Arc;

/// Issues arbitrary calls against a tenant on behalf of a session
pub struct ApiInvoker {
    client: Arc<TenantClient>,
    registry: Arc<SessionRegistry>,
    validator: SessionValidator,
}

impl ApiInvoker {
    pub fn new(client: Arc<TenantClient>, registry: Arc<SessionRegistry>) -> Self {
        let validator = SessionValidator::new(Arc::clone(&client), Arc::clone(&registry));
        Self {
            client,
            registry,
            validator,
        }
    }

    /// Invoke on the registered session for `host`, or the default session
    pub async fn invoke_host(
        &self,
        host: Option<&str>,
        call: &str,
        payload: Option<&str>,
    ) -> CliResult<Value> {
        let mut session = self.registry.resolve(host);
        self.invoke(session.as_mut(), call, payload).await
    }

    /// POST `payload` to `call` and return the envelope's `Result`.
    ///
    /// Validation errors pass through unchanged. Call failures are recorded
    /// as the registry's last error before being returned.
    pub async fn invoke(
        &self,
        session: Option<&mut Session>,
        call: &str,
        payload: Option<&str>,
    ) -> CliResult<Value> {
        let session = session.ok_or(AuthError::NoSession)?;
        self.validator.ensure_valid(Some(&mut *session)).await?;

        let url = self.client.config().api_call_url(&session.host, call);
        tracing::info!(host = %session.host, call, "invoking API call");

        let body = payload.unwrap_or_default().to_string();
        match self
            .client
            .post_raw_envelope::<Value>(&url, body, Some(session))
            .await
        {
            Ok(result) => Ok(result.unwrap_or(Value::Null)),
            Err(failure) => {
                let error = api_error(&failure)
                    .with_call(call)
                    .with_payload(payload)
                    .with_raw_response(failure.raw_response());
                tracing::warn!(call, error = %error.message, "API call failed");
                self.registry.record_error(error.clone());
                Err(error.into())
            }
        }
    }
}

fn api_error(failure: &CallFailure) -> ApiError {
    match failure {
        CallFailure::Transport(e) => ApiError::transport(failure.message()).with_cause(e),
        CallFailure::Malformed { status, .. } => {
            ApiError::transport(failure.message()).with_cause(format!("HTTP {status}"))
        }
        CallFailure::Rejected { .. } => ApiError::envelope(failure.message()),
    }
}
