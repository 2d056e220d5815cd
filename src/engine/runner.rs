//! engine::runner
//!
//! Dispatch of a parsed invocation to its handler.
//!
//! # Lifecycle
//!
//! 1. Resolve the command by name or alias
//! 2. Apply declared defaults and check required options
//! 3. Run the handler's local preflight checks
//! 4. Establish the credential: `--ci-token` for commands that accept it,
//!    otherwise a verified session for commands that need one
//! 5. Run the handler and fold its outcome into a [`CommandResult`]
//!
//! Steps 1 to 3 have no remote side effects, so an invocation with missing
//! options or a bad working directory never touches the network.

use super::command::CommandContext;
use super::options::OptionMap;
use super::registry::{is_legal_command_name, Registry};
use super::result::{CommandError, CommandResult, ErrorCode};
use super::Context;
use crate::api::{ApiClient, Credential};
use crate::auth::{LoginStrategy, SessionGate};
use crate::secrets::TokenStore;

/// Hint appended to unknown-command failures.
pub const HELP_HINT: &str = "Use \"stallion help\" to list all available commands";

/// Dispatches commands against a registry.
pub struct Runner<'a> {
    registry: &'a Registry,
    ctx: &'a Context,
    store: &'a dyn TokenStore,
    login: &'a dyn LoginStrategy,
}

impl<'a> Runner<'a> {
    /// Create a runner.
    pub fn new(
        registry: &'a Registry,
        ctx: &'a Context,
        store: &'a dyn TokenStore,
        login: &'a dyn LoginStrategy,
    ) -> Self {
        Self {
            registry,
            ctx,
            store,
            login,
        }
    }

    /// Execute `name` with `options`.
    pub async fn execute(&self, name: &str, mut options: OptionMap) -> CommandResult {
        if !is_legal_command_name(name) {
            return CommandResult::failure(
                ErrorCode::IllegalCommand,
                format!("Illegal command \"{}\"", name),
            );
        }

        let Some(descriptor) = self.registry.get(name) else {
            return CommandResult::failure(
                ErrorCode::NoSuchCommand,
                format!("Command \"{}\" not found\n{}", name, HELP_HINT),
            );
        };

        descriptor.apply_defaults(&mut options);
        let missing = descriptor.missing_required(&options);
        if !missing.is_empty() {
            return CommandResult::failure(
                ErrorCode::InvalidParameter,
                format!("Missing required options: {}", missing.join(", ")),
            );
        }

        let handler = (descriptor.handler)();
        if let Err(e) = handler.preflight(self.ctx, &options) {
            return CommandResult::from(Err(e));
        }

        let credential = if descriptor.supports_ci_token_bypass && options.has_value("ci-token") {
            log::info!("CI token provided, skipping user validation");
            options.text("ci-token").map(|t| Credential::Ci(t.to_string()))
        } else if descriptor.requires_session {
            let api = ApiClient::new(&self.ctx.config.api_url);
            let gate = SessionGate::new(self.store, &api, self.login);
            match gate.establish().await {
                Ok(token) => Some(Credential::Session(token)),
                Err(e) => {
                    return CommandResult::from(Err(CommandError::from(e)));
                }
            }
        } else {
            None
        };

        let cx = CommandContext {
            ctx: self.ctx,
            registry: self.registry,
            store: self.store,
            login: self.login,
            credential,
        };

        log::debug!("running command '{}'", descriptor.name);
        let result = CommandResult::from(handler.execute(&cx, &options).await);
        if let CommandResult::Failure { code, .. } = &result {
            log::debug!("command '{}' failed: {}", descriptor.name, code);
        }
        result
    }
}
