//! auth::login
//!
//! Interactive login flow.
//!
//! # Flow
//!
//! 1. Bind the callback server and open the console in a browser
//!    (best effort; a browser that fails to open is not an error)
//! 2. Race the browser callback against a manual token paste
//! 3. The first token to arrive wins; the other strategy is cancelled and,
//!    for the manual prompt, awaited so the terminal is restored
//! 4. Verify the token against the profile endpoint, then persist it. The
//!    browser is told the outcome only after both
//!
//! If the callback server cannot start or times out, the manual paste keeps
//! going on its own. If the terminal is not interactive, the callback server
//! races alone.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::callback_server::{self, CallbackReply, CallbackServer};
use super::AuthError;
use crate::api::{ApiClient, Credential};
use crate::secrets::{TokenEntry, TokenStore, CLI_SLOT};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::{self, PromptError};

/// Minimum length of a pasted token.
pub const MIN_TOKEN_LEN: usize = 5;

/// Something that can obtain a verified, persisted session token.
#[async_trait]
pub trait LoginStrategy: Send + Sync {
    /// Run the login and return the new token.
    async fn login(&self) -> Result<String, AuthError>;
}

/// Source of a manually pasted token. Called on a blocking thread.
pub trait ManualTokenSource: Send + Sync {
    /// Block until the user enters a token or `cancel` fires.
    ///
    /// Implementations must return soon after cancellation; the flow waits
    /// for them before it continues.
    fn read_token(&self, cancel: &CancellationToken) -> Result<String, PromptError>;
}

/// Reads the token from the terminal without echo.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    /// Whether stdin is attached to a user.
    pub interactive: bool,
}

impl ManualTokenSource for TerminalPrompt {
    fn read_token(&self, cancel: &CancellationToken) -> Result<String, PromptError> {
        prompts::password("Or paste your token here: ", self.interactive, cancel)
    }
}

/// Browser plus manual-paste login.
pub struct LoginFlow<'a> {
    api: &'a ApiClient,
    store: &'a dyn TokenStore,
    console_url: String,
    manual: Option<Arc<dyn ManualTokenSource>>,
    open_browser: bool,
    ports: RangeInclusive<u16>,
    timeout: Duration,
    verbosity: Verbosity,
}

impl<'a> LoginFlow<'a> {
    /// Create a flow with the default port range, timeout and a terminal prompt.
    pub fn new(
        api: &'a ApiClient,
        store: &'a dyn TokenStore,
        console_url: impl Into<String>,
        interactive: bool,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            api,
            store,
            console_url: console_url.into(),
            manual: Some(Arc::new(TerminalPrompt { interactive })),
            open_browser: true,
            ports: callback_server::PORT_RANGE,
            timeout: callback_server::DEFAULT_TIMEOUT,
            verbosity,
        }
    }

    /// Replace (or disable, with `None`) the manual token source.
    pub fn with_manual_source(mut self, manual: Option<Arc<dyn ManualTokenSource>>) -> Self {
        self.manual = manual;
        self
    }

    /// Enable or disable launching the browser.
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Use a different callback port range.
    pub fn with_ports(mut self, ports: RangeInclusive<u16>) -> Self {
        self.ports = ports;
        self
    }

    /// Use a different callback timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Console URL with the callback attached.
    pub fn login_url(&self, callback: &str) -> String {
        match url::Url::parse_with_params(&self.console_url, &[("callback", callback)]) {
            Ok(url) => url.to_string(),
            Err(_) => self.console_url.clone(),
        }
    }

    /// Run the flow against an already bound callback server.
    ///
    /// `None` means the server could not be started; the manual source then
    /// races alone.
    pub async fn run_with_server(&self, server: Option<CallbackServer>) -> Result<String, AuthError> {
        let target = match &server {
            Some(server) => self.login_url(&server.callback_url()),
            None => self.console_url.clone(),
        };
        self.launch_browser(&target);

        let received = self.race(server).await?;
        self.verify_and_store(received).await
    }

    fn launch_browser(&self, target: &str) {
        output::print(
            format!("Opening your browser...\n  Visit {} to log in.", target),
            self.verbosity,
        );
        if !self.open_browser {
            return;
        }
        if let Err(e) = open::that(target) {
            output::warn(
                format!("could not open a browser ({}); open the link manually", e),
                self.verbosity,
            );
        }
    }

    async fn race(&self, server: Option<CallbackServer>) -> Result<Received, AuthError> {
        let cancel = CancellationToken::new();
        // Stops the prompt on every exit, including a dropped login future.
        let _stop_prompt = cancel.clone().drop_guard();
        let manual = self
            .manual
            .as_ref()
            .map(|source| spawn_manual(source.clone(), cancel.clone()));

        match (server, manual) {
            (None, None) => Err(AuthError::NoStrategy),
            (Some(server), None) => browser_token(server.wait_for_token(self.timeout).await),
            (None, Some(manual)) => manual_token(manual.await),
            (Some(server), Some(mut manual)) => {
                let callback = server.wait_for_token(self.timeout);
                tokio::pin!(callback);

                let from_browser = tokio::select! {
                    from_browser = &mut callback => from_browser,
                    from_terminal = &mut manual => {
                        return match from_terminal {
                            Ok(Err(e)) if !matches!(e, PromptError::Interrupted) => {
                                log::debug!("manual entry unavailable ({}), waiting for browser", e);
                                browser_token(callback.await)
                            }
                            Err(e) => {
                                log::debug!("manual entry task failed ({}), waiting for browser", e);
                                browser_token(callback.await)
                            }
                            entered => manual_token(entered),
                        };
                    }
                };

                match from_browser {
                    Ok(delivered) => {
                        cancel.cancel();
                        if let Err(e) = manual.await {
                            log::debug!("manual entry task failed: {}", e);
                        }
                        browser_token(Ok(delivered))
                    }
                    Err(e) => {
                        log::debug!("browser login failed, waiting for manual entry: {}", e);
                        match manual.await {
                            Ok(Ok(token)) => validate_manual(token).map(Received::Manual),
                            Ok(Err(PromptError::Interrupted)) => Err(AuthError::Interrupted),
                            _ => Err(e),
                        }
                    }
                }
            }
        }
    }

    async fn verify_and_store(&self, received: Received) -> Result<String, AuthError> {
        let (token, reply) = match received {
            Received::Browser(token, reply) => (token, Some(reply)),
            Received::Manual(token) => (token, None),
        };

        let outcome = self.verify(&token).await;
        if let Some(reply) = reply {
            reply.send(outcome.is_ok());
        }
        outcome?;

        output::success("Logged in successfully", self.verbosity);
        Ok(token)
    }

    async fn verify(&self, token: &str) -> Result<(), AuthError> {
        let client = self
            .api
            .clone()
            .with_credential(Credential::Session(token.to_string()));
        client
            .verify_session()
            .await
            .map_err(|e| AuthError::Verification(e.to_string()))?;

        self.store.set(CLI_SLOT, TokenEntry::new(token.to_string()))?;
        Ok(())
    }
}

/// A token that won the race, with its origin.
enum Received {
    /// From the callback server, whose browser still awaits an answer.
    Browser(String, CallbackReply),
    /// Pasted at the terminal.
    Manual(String),
}

fn browser_token(result: Result<(String, CallbackReply), AuthError>) -> Result<Received, AuthError> {
    result.map(|(token, reply)| Received::Browser(token, reply))
}

fn manual_token(
    result: Result<Result<String, PromptError>, tokio::task::JoinError>,
) -> Result<Received, AuthError> {
    match result {
        Ok(Ok(token)) => validate_manual(token).map(Received::Manual),
        Ok(Err(PromptError::Interrupted)) => Err(AuthError::Interrupted),
        Ok(Err(e)) => Err(AuthError::Internal(format!("manual token entry failed: {}", e))),
        Err(_) => Err(AuthError::NoStrategy),
    }
}

#[async_trait]
impl LoginStrategy for LoginFlow<'_> {
    async fn login(&self) -> Result<String, AuthError> {
        let server = match CallbackServer::bind(self.ports.clone()) {
            Ok(server) => Some(server),
            Err(e) => {
                output::warn(format!("{}; falling back to manual entry", e), self.verbosity);
                None
            }
        };
        self.run_with_server(server).await
    }
}

fn spawn_manual(
    source: Arc<dyn ManualTokenSource>,
    cancel: CancellationToken,
) -> JoinHandle<Result<String, PromptError>> {
    tokio::task::spawn_blocking(move || source.read_token(&cancel))
}

/// Reject tokens that are empty or too short to be real.
pub fn validate_manual(token: String) -> Result<String, AuthError> {
    let token = token.trim().to_string();
    if token.chars().count() < MIN_TOKEN_LEN {
        return Err(AuthError::TokenTooShort { min: MIN_TOKEN_LEN });
    }
    Ok(token)
}
