//! Login protocol driver

use crate::api::TenantClient;
use crate::auth::{encode_client_secret, parse_selection, AuthState, Connected};
use crate::error::{AuthError, CliResult};
use crate::federation::{self, SamlBrowser};
use crate::interactive::Console;
use crate::models::{
    canonical_host, instance_id, AdvanceAuthenticationRequest, AdvanceAuthenticationResult,
    AnswerKind, AuthAction, AuthSummary, Challenge, CredentialSpec, Mechanism, Session,
    StartAuthenticationRequest, StartAuthenticationResult,
};
use crate::session::SessionRegistry;
use std::collections::VecDeque;
use std::sync::Arc;

/// Runs one login against one host and registers the resulting session
pub struct Authenticator<'a> {
    client: Arc<TenantClient>,
    registry: Arc<SessionRegistry>,
    console: &'a dyn Console,
    browser: &'a dyn SamlBrowser,
}

/// Per-login values every step needs
struct LoginTarget<'t> {
    host: &'t str,
    tenant_id: String,
    user: &'t str,
}

impl<'a> Authenticator<'a> {
    pub fn new(
        client: Arc<TenantClient>,
        registry: Arc<SessionRegistry>,
        console: &'a dyn Console,
        browser: &'a dyn SamlBrowser,
    ) -> Self {
        Self {
            client,
            registry,
            console,
            browser,
        }
    }

    /// Connect to `host` with the given credentials
    pub async fn connect(&self, host: &str, credentials: &CredentialSpec) -> CliResult<Connected> {
        match credentials {
            CredentialSpec::EncodeOnly { client, password } => {
                tracing::debug!(client = %client, "encoding client secret");
                Ok(Connected::EncodedSecret(encode_client_secret(client, password)))
            }
            CredentialSpec::ClientCredentials { client_id, .. } => {
                tracing::warn!(client_id = %client_id, "client-credentials login requested");
                Err(AuthError::UnsupportedCredentialMode(
                    "client-credentials login is disabled".to_string(),
                )
                .into())
            }
            CredentialSpec::Interactive { user } => {
                let session = self.login(host, user).await?;
                Ok(Connected::Session(session))
            }
        }
    }

    /// Drive the state machine to completion and register the session
    pub async fn login(&self, host: &str, user: &str) -> CliResult<Session> {
        let host = canonical_host(host);
        let target = LoginTarget {
            host: &host,
            tenant_id: instance_id(&host),
            user,
        };
        tracing::info!(host = %host, tenant_id = %target.tenant_id, "starting login");

        let mut state = AuthState::Start;
        loop {
            state = match state {
                AuthState::Authenticated { token, user } => {
                    return Ok(self.complete(&host, user, &token));
                }
                current => {
                    let from = current.name();
                    let next = self.step(&target, current).await?;
                    tracing::debug!(from, to = next.name(), "login state transition");
                    next
                }
            };
        }
    }

    /// Consume one state and produce the next
    async fn step(&self, target: &LoginTarget<'_>, state: AuthState) -> CliResult<AuthState> {
        match state {
            AuthState::Start => self.start(target).await,
            AuthState::Federated { redirect_url } => {
                let tokens =
                    federation::federate(&self.client, target.host, &redirect_url, self.browser)
                        .await?;
                let token = tokens
                    .bearer_token()
                    .ok_or_else(|| AuthError::FederationFailed("no access token".to_string()))?
                    .to_string();
                Ok(AuthState::Authenticated {
                    token,
                    user: tokens.user.clone().or_else(|| Some(target.user.to_string())),
                })
            }
            AuthState::SelectMechanism {
                session_id,
                mut challenges,
            } => {
                let challenge = challenges.pop_front().ok_or_else(|| {
                    AuthError::ChallengeFailed("no challenge left to answer".to_string())
                })?;
                let mechanism = self.select_mechanism(challenge)?;
                Ok(AuthState::Answer {
                    session_id,
                    mechanism,
                    remaining: challenges,
                })
            }
            AuthState::Answer {
                session_id,
                mechanism,
                remaining,
            } => self.answer(target, session_id, mechanism, remaining).await,
            AuthState::Poll {
                session_id,
                mechanism,
            } => self.poll(target, session_id, mechanism).await,
            AuthState::Authenticated { .. } => Ok(state),
        }
    }

    async fn start(&self, target: &LoginTarget<'_>) -> CliResult<AuthState> {
        let config = self.client.config();
        let request = StartAuthenticationRequest {
            tenant_id: target.tenant_id.clone(),
            user: target.user.to_string(),
            version: config.auth_version.clone(),
        };

        let result: StartAuthenticationResult = self
            .client
            .post_envelope(&config.start_authentication_url(target.host), &request, None)
            .await
            .map_err(|e| AuthError::StartFailed(e.message()))?
            .unwrap_or_default();

        if let Some(redirect_url) = result.federation_redirect() {
            tracing::info!(host = target.host, "user is federated");
            return Ok(AuthState::Federated {
                redirect_url: redirect_url.to_string(),
            });
        }

        let session_id = result
            .session_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::StartFailed("no session id returned".to_string()))?;

        if result.challenges.is_empty() {
            return Err(
                AuthError::ChallengeFailed("tenant returned no challenges".to_string()).into(),
            );
        }
        tracing::debug!(challenges = result.challenges.len(), "received challenges");

        Ok(AuthState::SelectMechanism {
            session_id,
            challenges: result.challenges.into(),
        })
    }

    fn select_mechanism(&self, challenge: Challenge) -> CliResult<Mechanism> {
        let mut mechanisms = challenge.mechanisms;
        let index = match mechanisms.len() {
            0 => {
                return Err(AuthError::InvalidSelection(
                    "challenge offers no mechanisms".to_string(),
                )
                .into())
            }
            1 => 0,
            count => {
                let labels: Vec<String> = mechanisms.iter().map(|m| m.label().to_string()).collect();
                let reply = self.console.choose("Select authentication mechanism", &labels)?;
                parse_selection(reply.as_deref(), count)?
            }
        };

        let mechanism = mechanisms.swap_remove(index);
        tracing::debug!(mechanism = %mechanism.name, "mechanism selected");
        Ok(mechanism)
    }

    async fn answer(
        &self,
        target: &LoginTarget<'_>,
        session_id: String,
        mechanism: Mechanism,
        remaining: VecDeque<Challenge>,
    ) -> CliResult<AuthState> {
        let (action, answer) = match mechanism.answer_kind() {
            Some(AnswerKind::Text) => {
                let secret = self.console.prompt_secret(&mechanism.chosen_prompt())?;
                (AuthAction::Answer, Some(secret))
            }
            Some(AnswerKind::OutOfBand) => {
                self.console.notify(&mechanism.chosen_prompt());
                (AuthAction::StartOob, None)
            }
            None => {
                return Err(AuthError::ChallengeFailed(format!(
                    "unsupported answer type '{}'",
                    mechanism.answer_type
                ))
                .into())
            }
        };

        let result = self
            .advance(target, &session_id, &mechanism, action, answer)
            .await?;

        match result.summary {
            AuthSummary::LoginSuccess => authenticated(result, target),
            AuthSummary::OobPending => Ok(AuthState::Poll {
                session_id,
                mechanism,
            }),
            AuthSummary::StartNextChallenge if !remaining.is_empty() => {
                Ok(AuthState::SelectMechanism {
                    session_id,
                    challenges: remaining,
                })
            }
            other => Err(AuthError::ChallengeFailed(format!("unexpected result '{other}'")).into()),
        }
    }

    async fn poll(
        &self,
        target: &LoginTarget<'_>,
        session_id: String,
        mechanism: Mechanism,
    ) -> CliResult<AuthState> {
        let code = self
            .console
            .prompt_text("Approve the request, or enter the code you received (Enter to continue)")?;

        let (action, answer) = match code {
            Some(code) => (AuthAction::Answer, Some(code)),
            None => (AuthAction::Poll, None),
        };

        let result = self
            .advance(target, &session_id, &mechanism, action, answer)
            .await?;

        match result.summary {
            AuthSummary::LoginSuccess => authenticated(result, target),
            other => Err(AuthError::ChallengeFailed(format!(
                "out-of-band verification ended with '{other}'"
            ))
            .into()),
        }
    }

    async fn advance(
        &self,
        target: &LoginTarget<'_>,
        session_id: &str,
        mechanism: &Mechanism,
        action: AuthAction,
        answer: Option<String>,
    ) -> CliResult<AdvanceAuthenticationResult> {
        let request = AdvanceAuthenticationRequest {
            tenant_id: target.tenant_id.clone(),
            session_id: session_id.to_string(),
            mechanism_id: mechanism.mechanism_id.clone(),
            action,
            answer,
        };
        tracing::debug!(action = %action, mechanism = %mechanism.name, "advancing authentication");

        let url = self.client.config().advance_authentication_url(target.host);
        let result = self
            .client
            .post_envelope::<_, AdvanceAuthenticationResult>(&url, &request, None)
            .await
            .map_err(|e| AuthError::ChallengeFailed(e.message()))?
            .ok_or_else(|| AuthError::ChallengeFailed("empty result".to_string()))?;

        tracing::debug!(summary = %result.summary, "authentication advanced");
        Ok(result)
    }

    fn complete(&self, host: &str, user: Option<String>, token: &str) -> Session {
        let session = Session::with_bearer(host, user, token);
        if self.registry.register(session.clone()) {
            tracing::info!(host, user = session.principal(), "session registered");
        } else {
            tracing::info!(host, "host already has a session, keeping the existing one");
        }
        session
    }
}

fn authenticated(
    result: AdvanceAuthenticationResult,
    target: &LoginTarget<'_>,
) -> CliResult<AuthState> {
    let token = result
        .tokens
        .bearer_token()
        .ok_or_else(|| AuthError::ChallengeFailed("login succeeded without a token".to_string()))?
        .to_string();

    Ok(AuthState::Authenticated {
        token,
        user: result
            .tokens
            .user
            .clone()
            .or_else(|| Some(target.user.to_string())),
    })
}
