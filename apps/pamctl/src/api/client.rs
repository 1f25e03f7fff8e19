//! HTTP client wrapper for tenant endpoints

use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::logging::Redactor;
use crate::models::{Envelope, Session};
use reqwest::{redirect, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use url::Url;

/// A response read to completion
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    /// Final URL after redirects
    pub url: Url,
    pub body: String,
}

/// Why an envelope call did not produce a successful result
#[derive(Debug)]
pub enum CallFailure {
    /// No response was read (connect, timeout, TLS, body read)
    Transport(reqwest::Error),
    /// A response arrived but was not an envelope
    Malformed { status: StatusCode, body: String },
    /// The envelope said `Success = false`
    Rejected { message: String, body: String },
}

impl CallFailure {
    /// Message to surface; the tenant's own text when there is one
    pub fn message(&self) -> String {
        match self {
            CallFailure::Transport(e) if e.is_timeout() => "Request timed out".to_string(),
            CallFailure::Transport(e) if e.is_connect() => format!("Connection failed: {e}"),
            CallFailure::Transport(e) => format!("Request failed: {e}"),
            CallFailure::Malformed { status, .. } => {
                format!("Unexpected response from tenant (HTTP {status})")
            }
            CallFailure::Rejected { message, .. } => message.clone(),
        }
    }

    /// The raw body, when one was read
    pub fn raw_response(&self) -> Option<String> {
        match self {
            CallFailure::Transport(_) => None,
            CallFailure::Malformed { body, .. } | CallFailure::Rejected { body, .. } => {
                Some(body.clone())
            }
        }
    }
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// HTTP client shared by login, validation and invocation.
///
/// One cookie jar spans all requests so the federated sign-in steps see the
/// cookies set by earlier ones.
pub struct TenantClient {
    client: Client,
    config: Config,
}

impl TenantClient {
    /// Create a new tenant client
    pub fn new(config: Config) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .cookie_store(true)
            .user_agent(concat!("pamctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CliError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Get a reference to the config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// POST a serializable JSON body and unwrap the envelope
    pub async fn post_envelope<B, T>(
        &self,
        url: &str,
        body: &B,
        session: Option<&Session>,
    ) -> Result<Option<T>, CallFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = with_session(self.client.post(url).json(body), session);
        let response = self.send("POST", url, request).await?;
        decode_envelope(response)
    }

    /// POST a caller-supplied JSON string and unwrap the envelope
    pub async fn post_raw_envelope<T>(
        &self,
        url: &str,
        body: String,
        session: Option<&Session>,
    ) -> Result<Option<T>, CallFailure>
    where
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        let response = self.send("POST", url, with_session(request, session)).await?;
        decode_envelope(response)
    }

    /// POST an url-encoded form
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<RawResponse, CallFailure> {
        let request = self.client.post(url).form(form);
        self.send("POST", url, request).await
    }

    /// GET a URL, following redirects
    pub async fn get(&self, url: &str) -> Result<RawResponse, CallFailure> {
        let request = self.client.get(url);
        self.send("GET", url, request).await
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<RawResponse, CallFailure> {
        let shown_url = Redactor::new().redact(url).into_owned();
        tracing::debug!(method, url = %shown_url, "sending request");
        let started = Instant::now();

        let response = request.send().await.map_err(|e| {
            tracing::debug!(method, url = %shown_url, error = %e, "request failed");
            CallFailure::Transport(e)
        })?;

        let status = response.status();
        let final_url = response.url().clone();
        let body = response.text().await.map_err(CallFailure::Transport)?;

        tracing::debug!(
            method,
            url = %shown_url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "received response"
        );
        tracing::trace!(body = %Redactor::new().redact(&body), "response body");

        Ok(RawResponse {
            status,
            url: final_url,
            body,
        })
    }
}

fn with_session(mut request: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
    if let Some(session) = session {
        for (name, value) in &session.auth_headers {
            request = request.header(name.as_str(), value.as_str());
        }
    }
    request
}

fn decode_envelope<T: DeserializeOwned>(response: RawResponse) -> Result<Option<T>, CallFailure> {
    let envelope: Envelope<T> = match serde_json::from_str(&response.body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(status = response.status.as_u16(), error = %e, "response is not an envelope");
            return Err(CallFailure::Malformed {
                status: response.status,
                body: response.body,
            });
        }
    };

    if envelope.success && response.status.is_success() {
        Ok(envelope.result)
    } else {
        Err(CallFailure::Rejected {
            message: envelope.failure_message(),
            body: response.body,
        })
    }
}
