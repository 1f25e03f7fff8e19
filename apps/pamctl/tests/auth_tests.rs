//! Integration tests for the interactive login state machine
//!
//! Tests cover:
//! - Single and multiple mechanism challenges
//! - Mechanism selection defaults and invalid input
//! - Out-of-band start and polling
//! - Multi-challenge logins
//! - First-wins session registration
//! - Credential modes that never touch the network

mod common;

use common::{
    envelope_failed, envelope_ok, login_success, mechanism, summary, Asked, ScriptedConsole,
    StubSamlBrowser, TestContext, ADVANCE_PATH, START_PATH,
};
use pamctl::auth::Connected;
use pamctl::error::{AuthError, CliError};
use pamctl::models::CredentialSpec;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

fn expect_session(connected: Connected) -> pamctl::models::Session {
    match connected {
        Connected::Session(session) => session,
        Connected::EncodedSecret(_) => panic!("expected a session"),
    }
}

// =============================================================================
// Successful logins
// =============================================================================

#[tokio::test]
async fn test_password_login_registers_session() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-up", "Password", "Text")]}
    ]))
    .await;

    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""MechanismId":"m-up""#))
        .and(body_string_contains(r#""Action":"Answer""#))
        .and(body_string_contains(r#""Answer":"hunter2""#))
        .respond_with(login_success("tok-1"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().secret("hunter2");
    let browser = StubSamlBrowser::default();
    let connected = ctx
        .context
        .authenticator(&console, &browser)
        .connect(&ctx.host, &CredentialSpec::interactive("alice@example.com"))
        .await
        .unwrap();

    let session = expect_session(connected);
    assert_eq!(session.bearer_token(), Some("tok-1"));
    assert_eq!(session.user.as_deref(), Some("alice@example.com"));
    assert_eq!(ctx.context.registry.len(), 1);
    assert_eq!(ctx.context.registry.default_host().as_deref(), Some(ctx.host.as_str()));
    assert_eq!(console.asked(), vec![Asked::Secret("Enter Password".into())]);
}

#[tokio::test]
async fn test_start_request_carries_tenant_and_user() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .and(body_string_contains(r#""TenantId":"127""#))
        .and(body_string_contains(r#""User":"alice@example.com""#))
        .and(body_string_contains(r#""Version":"1.0""#))
        .respond_with(envelope_ok(json!({
            "SessionId": "sess-1",
            "Challenges": [{"Mechanisms": [mechanism("m-up", "Password", "Text")]}]
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""SessionId":"sess-1""#))
        .respond_with(login_success("tok"))
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().secret("pw");
    let browser = StubSamlBrowser::default();
    ctx.context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_two_mechanisms_default_to_first() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [
            mechanism("m-1", "Password", "Text"),
            mechanism("m-2", "Security Question", "Text")
        ]}
    ]))
    .await;

    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""MechanismId":"m-1""#))
        .respond_with(login_success("tok"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().reply(None).secret("pw");
    let browser = StubSamlBrowser::default();
    ctx.context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap();

    let asked = console.asked();
    assert!(matches!(
        &asked[0],
        Asked::Choose(_, options) if options == &vec!["Password".to_string(), "Security Question".to_string()]
    ));
}

#[tokio::test]
async fn test_explicit_selection_picks_mechanism() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [
            mechanism("m-1", "Password", "Text"),
            mechanism("m-2", "Security Question", "Text")
        ]}
    ]))
    .await;

    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""MechanismId":"m-2""#))
        .respond_with(login_success("tok"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().reply(Some("2")).secret("blue");
    let browser = StubSamlBrowser::default();
    ctx.context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_out_of_band_then_poll() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-push", "Mobile Push", "StartOob")]}
    ]))
    .await;

    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""Action":"StartOOB""#))
        .respond_with(summary("OobPending"))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""Action":"Poll""#))
        .respond_with(login_success("tok-oob"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().reply(None);
    let browser = StubSamlBrowser::default();
    let session = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap();

    assert_eq!(session.bearer_token(), Some("tok-oob"));
    assert!(console
        .asked()
        .contains(&Asked::Notify("Enter Mobile Push".into())));
}

#[tokio::test]
async fn test_out_of_band_code_is_answered() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-email", "Email", "StartTextOob")]}
    ]))
    .await;

    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""Action":"StartOOB""#))
        .respond_with(summary("OobPending"))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""Action":"Answer""#))
        .and(body_string_contains(r#""Answer":"123456""#))
        .respond_with(login_success("tok"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().reply(Some("123456"));
    let browser = StubSamlBrowser::default();
    ctx.context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_second_challenge_after_start_next_challenge() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-up", "Password", "Text")]},
        {"Mechanisms": [mechanism("m-otp", "OATH OTP", "Text")]}
    ]))
    .await;

    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""MechanismId":"m-up""#))
        .respond_with(summary("StartNextChallenge"))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""MechanismId":"m-otp""#))
        .respond_with(login_success("tok-2fa"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().secret("pw").secret("654321");
    let browser = StubSamlBrowser::default();
    let session = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap();
    assert_eq!(session.bearer_token(), Some("tok-2fa"));
}

#[tokio::test]
async fn test_first_login_success_ends_login() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-up", "Password", "Text")]},
        {"Mechanisms": [mechanism("m-otp", "OATH OTP", "Text")]}
    ]))
    .await;

    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .respond_with(login_success("tok"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().secret("pw");
    let browser = StubSamlBrowser::default();
    ctx.context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap();
    assert_eq!(console.asked().len(), 1);
}

#[tokio::test]
async fn test_second_connect_keeps_first_session() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-up", "Password", "Text")]}
    ]))
    .await;

    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .respond_with(login_success("tok-first"))
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .respond_with(login_success("tok-second"))
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().secret("pw").secret("pw");
    let browser = StubSamlBrowser::default();
    let authenticator = ctx.context.authenticator(&console, &browser);
    authenticator.login(&ctx.host, "alice@example.com").await.unwrap();
    authenticator.login(&ctx.host, "alice@example.com").await.unwrap();

    assert_eq!(ctx.context.registry.len(), 1);
    let stored = ctx.context.registry.get(&ctx.host).unwrap();
    assert_eq!(stored.bearer_token(), Some("tok-first"));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_zero_mechanisms_is_invalid_selection() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([{"Mechanisms": []}])).await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .respond_with(login_success("tok"))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new();
    let browser = StubSamlBrowser::default();
    let err = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Auth(AuthError::InvalidSelection(_))));
    assert!(ctx.context.registry.is_empty());
}

#[tokio::test]
async fn test_out_of_range_selection_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [
            mechanism("m-1", "Password", "Text"),
            mechanism("m-2", "Email", "StartOob")
        ]}
    ]))
    .await;

    let console = ScriptedConsole::new().reply(Some("3"));
    let browser = StubSamlBrowser::default();
    let err = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Auth(AuthError::InvalidSelection(_))));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(ctx.hits(ADVANCE_PATH).await, 0);
}

#[tokio::test]
async fn test_start_failure_reports_tenant_message() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .respond_with(envelope_failed("Unknown tenant"))
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new();
    let browser = StubSamlBrowser::default();
    let err = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to start authentication: Unknown tenant"
    );
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_rejected_answer_is_challenge_failed() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-up", "Password", "Text")]}
    ]))
    .await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .respond_with(envelope_failed("Authentication (login or challenge) has failed."))
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().secret("wrong");
    let browser = StubSamlBrowser::default();
    let err = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CliError::Auth(AuthError::ChallengeFailed(ref msg)) if msg.contains("has failed")
    ));
    assert!(ctx.context.registry.is_empty());
}

#[tokio::test]
async fn test_poll_without_success_fails() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-push", "Mobile Push", "StartOob")]}
    ]))
    .await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""Action":"StartOOB""#))
        .respond_with(summary("OobPending"))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .and(body_string_contains(r#""Action":"Poll""#))
        .respond_with(summary("OobPending"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().reply(None);
    let browser = StubSamlBrowser::default();
    let err = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Auth(AuthError::ChallengeFailed(_))));
}

#[tokio::test]
async fn test_unsupported_answer_type_fails() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-fido", "Security Key", "Fido2")]}
    ]))
    .await;

    let console = ScriptedConsole::new();
    let browser = StubSamlBrowser::default();
    let err = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Auth(AuthError::ChallengeFailed(ref msg)) if msg.contains("Fido2")));
    assert_eq!(ctx.hits(ADVANCE_PATH).await, 0);
}

#[tokio::test]
async fn test_login_success_without_token_fails() {
    let ctx = TestContext::new().await;
    ctx.mock_start_with_challenges(json!([
        {"Mechanisms": [mechanism("m-up", "Password", "Text")]}
    ]))
    .await;
    Mock::given(method("POST"))
        .and(path(ADVANCE_PATH))
        .respond_with(summary("LoginSuccess"))
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new().secret("pw");
    let browser = StubSamlBrowser::default();
    let err = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Auth(AuthError::ChallengeFailed(_))));
    assert!(ctx.context.registry.is_empty());
}

#[tokio::test]
async fn test_unreachable_tenant_is_start_failed() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&ctx.server)
        .await;

    let console = ScriptedConsole::new();
    let browser = StubSamlBrowser::default();
    let err = ctx
        .context
        .authenticator(&console, &browser)
        .login(&ctx.host, "alice@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Auth(AuthError::StartFailed(ref msg)) if msg.contains("503")));
}

// =============================================================================
// Credential modes without network traffic
// =============================================================================

#[tokio::test]
async fn test_client_credentials_is_unsupported() {
    let ctx = TestContext::new().await;
    let console = ScriptedConsole::new();
    let browser = StubSamlBrowser::default();

    let err = ctx
        .context
        .authenticator(&console, &browser)
        .connect(
            &ctx.host,
            &CredentialSpec::ClientCredentials {
                client_id: "svc".into(),
                scope: "all".into(),
                secret: "s3cret".into(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CliError::Auth(AuthError::UnsupportedCredentialMode(_))
    ));
    assert!(ctx.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_encode_only_returns_base64() {
    let ctx = TestContext::new().await;
    let console = ScriptedConsole::new();
    let browser = StubSamlBrowser::default();

    let connected = ctx
        .context
        .authenticator(&console, &browser)
        .connect(
            &ctx.host,
            &CredentialSpec::EncodeOnly {
                client: "c1".into(),
                password: "p1".into(),
            },
        )
        .await
        .unwrap();

    assert!(matches!(connected, Connected::EncodedSecret(ref s) if s == "YzE6cDE="));
    assert!(ctx.server.received_requests().await.unwrap().is_empty());
    assert!(ctx.context.registry.is_empty());
}
