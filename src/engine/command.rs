//! engine::command
//!
//! The handler trait every command implements.
//!
//! # Invariants
//!
//! - Handlers only run after required options were checked
//! - `preflight` runs before the session gate, so local validation never
//!   waits on a login
//! - Handlers of session-gated commands always receive a credential
//! - Handlers report failure through `CommandError`, never by exiting

use async_trait::async_trait;

use super::options::OptionMap;
use super::registry::Registry;
use super::result::CommandError;
use super::Context;
use crate::api::{ApiClient, Credential};
use crate::auth::LoginStrategy;
use crate::secrets::TokenStore;

/// Everything a handler may use besides its options.
pub struct CommandContext<'a> {
    /// Global flags and configuration.
    pub ctx: &'a Context,
    /// The registry the command was resolved from.
    pub registry: &'a Registry,
    /// Credential storage.
    pub store: &'a dyn TokenStore,
    /// Login flow, for commands that log in explicitly.
    pub login: &'a dyn LoginStrategy,
    /// Credential established by the runner, if any.
    pub credential: Option<Credential>,
}

impl CommandContext<'_> {
    /// API client carrying the established credential.
    pub fn api(&self) -> ApiClient {
        let client = ApiClient::new(&self.ctx.config.api_url);
        match &self.credential {
            Some(credential) => client.with_credential(credential.clone()),
            None => client,
        }
    }
}

/// A command implementation.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Check local preconditions before any credential is established.
    ///
    /// Must not touch the network. The default accepts everything.
    fn preflight(&self, _ctx: &Context, _options: &OptionMap) -> Result<(), CommandError> {
        Ok(())
    }

    /// Run the command with normalized options.
    async fn execute(&self, cx: &CommandContext<'_>, options: &OptionMap) -> Result<(), CommandError>;
}
