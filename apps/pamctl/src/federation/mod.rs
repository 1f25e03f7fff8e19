//! Federated (SAML) sign-in
//!
//! The tenant hands the user to an external IdP, the IdP returns a SAML
//! assertion, and the tenant exchanges it through its OIDC endpoint for a
//! browser identity carrying the bearer token. All steps share the client's
//! cookie jar.

mod browser;
mod html;

pub use browser::{SamlAssertion, SamlBrowser, TerminalSamlBrowser};
pub use html::{extract_hidden_field, query_param, FederationFields};

use crate::api::{CallFailure, RawResponse, TenantClient};
use crate::error::{AuthError, CliResult};
use crate::models::IdentityTokens;
use serde_json::json;
use url::Url;

const RELAY_STATE: &str = "RelayState";

/// Run the federated exchange for `host` starting at the tenant's redirect URL
pub async fn federate(
    client: &TenantClient,
    host: &str,
    redirect_url: &str,
    browser: &dyn SamlBrowser,
) -> CliResult<IdentityTokens> {
    let config = client.config();

    let redirect = parse_redirect(redirect_url)?;
    let landing = expect_ok("IdP redirect", client.get(redirect.as_str()).await)?;
    let idp_login_url = landing.url.clone();
    tracing::info!(idp = %idp_login_url.host_str().unwrap_or_default(), "resolved IdP login URL");

    let discovered_relay = query_param(&idp_login_url, RELAY_STATE)
        .or_else(|| extract_hidden_field(&landing.body, RELAY_STATE));

    let assertion = browser.obtain_assertion(&idp_login_url)?;
    if assertion.saml_response.is_empty() {
        return Err(failed("no SAML response was provided"));
    }
    let relay_state = assertion
        .relay_state
        .filter(|r| !r.trim().is_empty())
        .or(discovered_relay)
        .ok_or_else(|| failed("IdP login URL carried no RelayState"))?;

    let consumer = expect_ok(
        "assertion consumer",
        client
            .post_form(
                &config.assertion_consumer_url(host),
                &[
                    ("SAMLResponse", assertion.saml_response.as_str()),
                    (RELAY_STATE, relay_state.as_str()),
                ],
            )
            .await,
    )?;
    let fields = FederationFields::scrape(&consumer.body)?;
    tracing::debug!(?fields, "scraped sign-in fields");

    expect_ok(
        "signin-oidc",
        client
            .post_form(&config.signin_oidc_url(host), &fields.as_form())
            .await,
    )?;

    let tokens: IdentityTokens = client
        .post_envelope::<_, IdentityTokens>(&config.browser_identity_url(host), &json!({}), None)
        .await
        .map_err(|e| failed(format!("browser identity: {e}")))?
        .ok_or_else(|| failed("browser identity returned no result"))?;

    if tokens.bearer_token().is_none() {
        return Err(failed("browser identity carried no access token"));
    }

    tracing::info!(host, "federated sign-in completed");
    Ok(tokens)
}

fn failed(message: impl Into<String>) -> crate::error::CliError {
    AuthError::FederationFailed(message.into()).into()
}

/// Accept only a 200 response
fn expect_ok(step: &str, response: Result<RawResponse, CallFailure>) -> CliResult<RawResponse> {
    let response = response.map_err(|e| failed(format!("{step}: {e}")))?;
    if response.status != reqwest::StatusCode::OK {
        return Err(failed(format!("{step} returned HTTP {}", response.status)));
    }
    Ok(response)
}

/// Parse a redirect URL handed out by the tenant
fn parse_redirect(redirect_url: &str) -> Result<Url, AuthError> {
    Url::parse(redirect_url.trim())
        .map_err(|e| AuthError::FederationFailed(format!("invalid IdP redirect URL: {e}")))
}
