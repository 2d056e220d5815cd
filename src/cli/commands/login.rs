//! cli::commands::login
//!
//! Log in through the browser or by pasting a token.
//!
//! A stored token is never reused here: `login` always runs the full flow
//! and replaces the stored credential once the new token is verified.

use async_trait::async_trait;

use crate::engine::{CommandContext, CommandDescriptor, CommandError, CommandHandler, OptionMap};

pub const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
    name: "login",
    description: "Log in to Stallion",
    alias: None,
    options: &[],
    requires_session: false,
    supports_ci_token_bypass: false,
    handler,
};

pub struct Login;

fn handler() -> Box<dyn CommandHandler> {
    Box::new(Login)
}

#[async_trait]
impl CommandHandler for Login {
    async fn execute(&self, cx: &CommandContext<'_>, _options: &OptionMap) -> Result<(), CommandError> {
        cx.login.login().await?;
        Ok(())
    }
}
