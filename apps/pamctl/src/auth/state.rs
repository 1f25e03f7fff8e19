//! States of the interactive login protocol

use crate::models::{Challenge, Mechanism};
use std::collections::VecDeque;
use std::fmt;

/// Where a login currently stands.
///
/// Each variant owns exactly the data the next step needs; the authenticator
/// consumes one state and produces the next until `Authenticated`.
#[derive(Clone)]
pub enum AuthState {
    /// Nothing sent yet
    Start,

    /// The tenant delegated the user to an external IdP
    Federated { redirect_url: String },

    /// Pick a mechanism for the front challenge
    SelectMechanism {
        session_id: String,
        challenges: VecDeque<Challenge>,
    },

    /// Answer or start the chosen mechanism
    Answer {
        session_id: String,
        mechanism: Mechanism,
        remaining: VecDeque<Challenge>,
    },

    /// Out-of-band approval is pending
    Poll {
        session_id: String,
        mechanism: Mechanism,
    },

    /// Login finished with a bearer token
    Authenticated { token: String, user: Option<String> },
}

impl AuthState {
    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Start => "start",
            AuthState::Federated { .. } => "federated",
            AuthState::SelectMechanism { .. } => "select-mechanism",
            AuthState::Answer { .. } => "answer",
            AuthState::Poll { .. } => "poll",
            AuthState::Authenticated { .. } => "authenticated",
        }
    }
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthState").field(&self.name()).finish()
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
