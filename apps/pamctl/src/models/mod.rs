//! Data models for pamctl

pub mod auth;
mod credentials;
mod envelope;
mod session;

pub use auth::{
    AdvanceAuthenticationRequest, AdvanceAuthenticationResult, AnswerKind, AuthAction,
    AuthSummary, Challenge, IdentityTokens, Mechanism, OAuthTokens, StartAuthenticationRequest,
    StartAuthenticationResult,
};
pub use credentials::CredentialSpec;
pub use envelope::Envelope;
pub use session::{canonical_host, instance_id, Session};
