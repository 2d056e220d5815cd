//! auth::session
//!
//! Session state machine gating commands that need a logged-in user.
//!
//! # States
//!
//! ```text
//!   load ──► NoToken ─────────────┐
//!     │                           ▼
//!     └──► Unverified ──fail──► Invalid ──login──► Verified
//!               │                                     ▲
//!               └────────────ok───────────────────────┘
//! ```
//!
//! `Verified` is the only state from which a command may run. The CI token
//! bypass never enters this machine; the runner skips it entirely.

use std::fmt;

use super::login::LoginStrategy;
use super::AuthError;
use crate::api::{ApiClient, Credential};
use crate::secrets::{TokenStore, CLI_SLOT};

/// Where the session currently stands.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing stored.
    NoToken,
    /// A token is stored but has not been checked yet.
    Unverified(String),
    /// The service accepted the token.
    Verified(String),
    /// The stored token was rejected or could not be checked.
    Invalid,
}

impl SessionState {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::NoToken => "no-token",
            SessionState::Unverified(_) => "unverified",
            SessionState::Verified(_) => "verified",
            SessionState::Invalid => "invalid",
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Drives a session to `Verified`.
pub struct SessionGate<'a> {
    store: &'a dyn TokenStore,
    api: &'a ApiClient,
    login: &'a dyn LoginStrategy,
}

impl<'a> SessionGate<'a> {
    /// Create a gate over the given store, API and login strategy.
    pub fn new(store: &'a dyn TokenStore, api: &'a ApiClient, login: &'a dyn LoginStrategy) -> Self {
        Self { store, api, login }
    }

    /// Initial state from the token store.
    pub fn load(&self) -> Result<SessionState, AuthError> {
        Ok(match self.store.token(CLI_SLOT)? {
            Some(token) if !token.trim().is_empty() => SessionState::Unverified(token),
            _ => SessionState::NoToken,
        })
    }

    /// Advance one transition.
    pub async fn step(&self, state: SessionState) -> Result<SessionState, AuthError> {
        match state {
            SessionState::NoToken | SessionState::Invalid => {
                let token = self.login.login().await?;
                Ok(SessionState::Verified(token))
            }
            SessionState::Unverified(token) => {
                let client = self
                    .api
                    .clone()
                    .with_credential(Credential::Session(token.clone()));
                match client.verify_session().await {
                    Ok(_) => Ok(SessionState::Verified(token)),
                    Err(e) => {
                        log::debug!("stored session rejected: {}", e);
                        Ok(SessionState::Invalid)
                    }
                }
            }
            verified @ SessionState::Verified(_) => Ok(verified),
        }
    }

    /// Run the machine until the session is verified and return the token.
    pub async fn establish(&self) -> Result<String, AuthError> {
        let mut state = self.load()?;
        loop {
            log::debug!("session state: {:?}", state);
            state = match state {
                SessionState::Verified(token) => return Ok(token),
                other => self.step(other).await?,
            };
        }
    }
}
