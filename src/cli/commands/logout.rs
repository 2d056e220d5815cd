//! cli::commands::logout

use async_trait::async_trait;

use crate::engine::{CommandContext, CommandDescriptor, CommandError, CommandHandler, OptionMap};
use crate::secrets::CLI_SLOT;
use crate::ui::output;

pub const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
    name: "logout",
    description: "Remove the stored credential",
    alias: None,
    options: &[],
    requires_session: false,
    supports_ci_token_bypass: false,
    handler,
};

pub struct Logout;

fn handler() -> Box<dyn CommandHandler> {
    Box::new(Logout)
}

#[async_trait]
impl CommandHandler for Logout {
    async fn execute(&self, cx: &CommandContext<'_>, _options: &OptionMap) -> Result<(), CommandError> {
        cx.store.remove(CLI_SLOT)?;
        output::success("Logged out successfully", cx.ctx.verbosity);
        Ok(())
    }
}
