//! cli::commands::generate_key_pair
//!
//! Create the RSA key pair used for bundle signing.

use async_trait::async_trait;

use crate::bundle::{keys, ReactNativeProject};
use crate::core::paths;
use crate::engine::{
    CommandContext, CommandDescriptor, CommandError, CommandHandler, Context, OptionMap,
};
use crate::ui::output;

pub const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
    name: "generate-key-pair",
    description: "Generate a key pair for signing bundles",
    alias: Some("gkp"),
    options: &[],
    requires_session: false,
    supports_ci_token_bypass: false,
    handler,
};

pub struct GenerateKeyPair;

fn handler() -> Box<dyn CommandHandler> {
    Box::new(GenerateKeyPair)
}

#[async_trait]
impl CommandHandler for GenerateKeyPair {
    fn preflight(&self, ctx: &Context, _options: &OptionMap) -> Result<(), CommandError> {
        ReactNativeProject::require(&ctx.cwd)?;
        Ok(())
    }

    async fn execute(&self, cx: &CommandContext<'_>, _options: &OptionMap) -> Result<(), CommandError> {
        let project = ReactNativeProject::require(&cx.ctx.cwd)?;
        let dir = paths::secret_keys_dir(&project.root);

        let (private_key, public_key) = keys::generate_key_pair(&dir)?;

        let verbosity = cx.ctx.verbosity;
        output::success("Key pair generated", verbosity);
        output::print(format!("  private key: {}", private_key.display()), verbosity);
        output::print(format!("  public key:  {}", public_key.display()), verbosity);
        output::print(
            "Pass the private key to publish-bundle with --private-key. Keep it out of version control.",
            verbosity,
        );
        Ok(())
    }
}
