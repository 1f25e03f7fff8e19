//! Request and response bodies of the tenant login protocol

use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `Security/StartAuthentication`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartAuthenticationRequest {
    pub tenant_id: String,
    pub user: String,
    pub version: String,
}

/// Result of `Security/StartAuthentication`.
///
/// Either `idp_redirect_url` is set (the user is federated) or `challenges`
/// lists the factors to satisfy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartAuthenticationResult {
    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub challenges: Vec<Challenge>,

    #[serde(default)]
    pub idp_redirect_url: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,
}

impl StartAuthenticationResult {
    pub fn federation_redirect(&self) -> Option<&str> {
        self.idp_redirect_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// One required authentication factor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Challenge {
    #[serde(default)]
    pub mechanisms: Vec<Mechanism>,
}

/// One concrete way of satisfying a challenge
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Mechanism {
    pub mechanism_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub answer_type: String,

    #[serde(default)]
    pub prompt_select_mech: Option<String>,

    #[serde(default)]
    pub prompt_mech_chosen: Option<String>,
}

/// How a mechanism expects to be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    /// The user types a secret (password, one-time code)
    Text,
    /// The user acts elsewhere (push approval, emailed link)
    OutOfBand,
}

impl Mechanism {
    /// Label shown when the user picks between mechanisms
    pub fn label(&self) -> &str {
        self.prompt_select_mech
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(self.name.as_str())
    }

    /// Prompt shown once the mechanism is chosen
    pub fn chosen_prompt(&self) -> String {
        self.prompt_mech_chosen
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| format!("{}:", self.label()))
    }

    pub fn answer_kind(&self) -> Option<AnswerKind> {
        match self.answer_type.as_str() {
            "Text" => Some(AnswerKind::Text),
            "StartOob" | "StartTextOob" => Some(AnswerKind::OutOfBand),
            _ => None,
        }
    }
}

/// Action submitted to `Security/AdvanceAuthentication`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthAction {
    Answer,
    #[serde(rename = "StartOOB")]
    StartOob,
    Poll,
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthAction::Answer => write!(f, "Answer"),
            AuthAction::StartOob => write!(f, "StartOOB"),
            AuthAction::Poll => write!(f, "Poll"),
        }
    }
}

/// Body of `Security/AdvanceAuthentication`
#[derive(Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdvanceAuthenticationRequest {
    pub tenant_id: String,
    pub session_id: String,
    pub mechanism_id: String,
    pub action: AuthAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl fmt::Debug for AdvanceAuthenticationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvanceAuthenticationRequest")
            .field("tenant_id", &self.tenant_id)
            .field("session_id", &self.session_id)
            .field("mechanism_id", &self.mechanism_id)
            .field("action", &self.action)
            .field("answer", &self.answer.as_ref().map(|_| crate::logging::REDACTED))
            .finish()
    }
}

/// Summary of an AdvanceAuthentication step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum AuthSummary {
    LoginSuccess,
    OobPending,
    StartNextChallenge,
    Other(String),
}

impl From<String> for AuthSummary {
    fn from(value: String) -> Self {
        match value.as_str() {
            "LoginSuccess" => AuthSummary::LoginSuccess,
            "OobPending" => AuthSummary::OobPending,
            "StartNextChallenge" => AuthSummary::StartNextChallenge,
            _ => AuthSummary::Other(value),
        }
    }
}

impl fmt::Display for AuthSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthSummary::LoginSuccess => write!(f, "LoginSuccess"),
            AuthSummary::OobPending => write!(f, "OobPending"),
            AuthSummary::StartNextChallenge => write!(f, "StartNextChallenge"),
            AuthSummary::Other(s) => write!(f, "{s}"),
        }
    }
}

/// OAuth token payload returned on successful login
#[derive(Clone, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Token material carried by login and browser identity results
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityTokens {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(rename = "OAuthTokens", default)]
    pub oauth_tokens: Option<OAuthTokens>,

    #[serde(default)]
    pub user: Option<String>,
}

impl IdentityTokens {
    /// The bearer credential: the OAuth access token, else the plain token
    pub fn bearer_token(&self) -> Option<&str> {
        let oauth = self
            .oauth_tokens
            .as_ref()
            .map(|t| t.access_token.as_str())
            .filter(|t| !t.is_empty());
        oauth.or_else(|| self.token.as_deref().filter(|t| !t.is_empty()))
    }
}

impl fmt::Debug for IdentityTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityTokens")
            .field("has_token", &self.bearer_token().is_some())
            .field("user", &self.user)
            .finish()
    }
}

/// Result of `Security/AdvanceAuthentication`
#[derive(Debug, Clone, Deserialize)]
pub struct AdvanceAuthenticationResult {
    #[serde(rename = "Summary")]
    pub summary: AuthSummary,

    #[serde(flatten)]
    pub tokens: IdentityTokens,
}
