//! Shared fixtures for integration tests: a mock tenant, a scripted console
//! and a stub SAML browser.

#![allow(dead_code)]

use pamctl::config::Config;
use pamctl::error::{CliError, CliResult};
use pamctl::federation::{SamlAssertion, SamlBrowser};
use pamctl::interactive::Console;
use pamctl::models::Session;
use pamctl::TenantContext;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const START_PATH: &str = "/identity/Security/StartAuthentication";
pub const ADVANCE_PATH: &str = "/identity/Security/AdvanceAuthentication";
pub const USER_INFO_PATH: &str = "/identity/UserMgmt/GetUserInfo";
pub const ACS_PATH: &str = "/identity-federation/saml/assertion-consumer";
pub const SIGNIN_OIDC_PATH: &str = "/identity/signin-oidc";
pub const BROWSER_IDENTITY_PATH: &str = "/identity/Security/BrowserIdentity";

/// A mock tenant and a context pointed at it
pub struct TestContext {
    pub server: MockServer,
    pub context: TenantContext,
    /// `127.0.0.1:<port>`, the tenant host as the CLI sees it
    pub host: String,
}

impl TestContext {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let host = server.address().to_string();
        let config = Config {
            scheme: "http".to_string(),
            timeout_secs: 5,
            ..Config::default()
        };
        let context = TenantContext::new(config).expect("context");
        Self {
            server,
            context,
            host,
        }
    }

    /// Register a session directly, bypassing login
    pub fn register_session(&self, token: &str) -> Session {
        let session = Session::with_bearer(&self.host, Some("alice@example.com".into()), token);
        self.context.registry.register(session.clone());
        session
    }

    /// Number of requests the tenant received on `request_path`
    pub async fn hits(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }

    pub async fn mock_start_with_challenges(&self, challenges: Value) {
        Mock::given(method("POST"))
            .and(path(START_PATH))
            .respond_with(envelope_ok(json!({
                "SessionId": "sess-1",
                "Challenges": challenges
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_user_info_ok(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(USER_INFO_PATH))
            .respond_with(envelope_ok(json!({"Name": "alice@example.com"})))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }
}

pub fn envelope_ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Success": true,
        "Result": result,
        "Message": null
    }))
}

pub fn envelope_failed(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Success": false,
        "Result": null,
        "Message": message
    }))
}

pub fn login_success(token: &str) -> ResponseTemplate {
    envelope_ok(json!({
        "Summary": "LoginSuccess",
        "Token": format!("legacy-{token}"),
        "OAuthTokens": {"access_token": token, "token_type": "Bearer", "expires_in": 3600},
        "User": "alice@example.com"
    }))
}

pub fn summary(value: &str) -> ResponseTemplate {
    envelope_ok(json!({"Summary": value}))
}

pub fn mechanism(id: &str, name: &str, answer_type: &str) -> Value {
    json!({
        "MechanismId": id,
        "Name": name,
        "AnswerType": answer_type,
        "PromptSelectMech": name,
        "PromptMechChosen": format!("Enter {name}")
    })
}

/// What the scripted console was asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asked {
    Text(String),
    Secret(String),
    Choose(String, Vec<String>),
    Notify(String),
}

/// Console that replays scripted answers and records every interaction
#[derive(Default)]
pub struct ScriptedConsole {
    replies: Mutex<VecDeque<Option<String>>>,
    secrets: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<Asked>>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `prompt_text` or `choose`; `None` is empty input
    pub fn reply(self, reply: Option<&str>) -> Self {
        self.replies.lock().push_back(reply.map(str::to_string));
        self
    }

    pub fn secret(self, secret: &str) -> Self {
        self.secrets.lock().push_back(secret.to_string());
        self
    }

    pub fn asked(&self) -> Vec<Asked> {
        self.asked.lock().clone()
    }

    fn next_reply(&self) -> CliResult<Option<String>> {
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| CliError::InputError("no scripted reply left".into()))
    }
}

impl Console for ScriptedConsole {
    fn prompt_text(&self, prompt: &str) -> CliResult<Option<String>> {
        self.asked.lock().push(Asked::Text(prompt.to_string()));
        self.next_reply()
    }

    fn prompt_secret(&self, prompt: &str) -> CliResult<String> {
        self.asked.lock().push(Asked::Secret(prompt.to_string()));
        self.secrets
            .lock()
            .pop_front()
            .ok_or_else(|| CliError::InputError("no scripted secret left".into()))
    }

    fn choose(&self, prompt: &str, options: &[String]) -> CliResult<Option<String>> {
        self.asked
            .lock()
            .push(Asked::Choose(prompt.to_string(), options.to_vec()));
        self.next_reply()
    }

    fn notify(&self, message: &str) {
        self.asked.lock().push(Asked::Notify(message.to_string()));
    }
}

/// Browser that returns a fixed assertion and remembers the login URL
pub struct StubSamlBrowser {
    assertion: SamlAssertion,
    seen: Mutex<Option<Url>>,
}

impl StubSamlBrowser {
    pub fn new(saml_response: &str) -> Self {
        Self {
            assertion: SamlAssertion {
                saml_response: saml_response.to_string(),
                relay_state: None,
            },
            seen: Mutex::new(None),
        }
    }

    pub fn seen_url(&self) -> Option<Url> {
        self.seen.lock().clone()
    }
}

impl Default for StubSamlBrowser {
    fn default() -> Self {
        Self::new("PHNhbWxwOlJlc3BvbnNlPg==")
    }
}

impl SamlBrowser for StubSamlBrowser {
    fn obtain_assertion(&self, idp_login_url: &Url) -> CliResult<SamlAssertion> {
        *self.seen.lock() = Some(idp_login_url.clone());
        Ok(self.assertion.clone())
    }
}
