//! cli::commands::help
//!
//! Listing of every registered command.

use async_trait::async_trait;

use crate::engine::{
    CommandContext, CommandDescriptor, CommandError, CommandHandler, OptionKind, OptionMap,
    Registry,
};
use crate::ui::output;

pub const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
    name: "help",
    description: "List all available commands",
    alias: Some("h"),
    options: &[],
    requires_session: false,
    supports_ci_token_bypass: false,
    handler,
};

pub struct Help;

fn handler() -> Box<dyn CommandHandler> {
    Box::new(Help)
}

#[async_trait]
impl CommandHandler for Help {
    async fn execute(&self, cx: &CommandContext<'_>, _options: &OptionMap) -> Result<(), CommandError> {
        output::print(render(cx.registry), cx.ctx.verbosity);
        Ok(())
    }
}

/// Render the command listing.
pub fn render(registry: &Registry) -> String {
    let label = |d: &CommandDescriptor| match d.alias {
        Some(alias) => format!("{} ({})", d.name, alias),
        None => d.name.to_string(),
    };
    let width = registry
        .commands()
        .iter()
        .map(|d| label(d).len())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Usage: stallion <command> [options]\n\nCommands:\n");
    for descriptor in registry.commands() {
        out.push_str(&format!(
            "  {:width$}  {}\n",
            label(descriptor),
            descriptor.description,
            width = width
        ));
        for opt in descriptor.options {
            let flag = match opt.kind {
                OptionKind::Value => format!("--{} <value>", opt.name),
                OptionKind::Flag => format!("--{}", opt.name),
            };
            let required = if opt.required { " (required)" } else { "" };
            out.push_str(&format!(
                "      {:28} {}{}\n",
                flag, opt.description, required
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::builtin_registry;

    #[test]
    fn listing_shows_names_aliases_and_options() {
        let registry = builtin_registry().unwrap();
        let text = render(&registry);

        assert!(text.contains("publish-bundle (pb)"));
        assert!(text.contains("release-bundle (rb)"));
        assert!(text.contains("help (h)"));
        assert!(text.contains("--upload-path <value>"));
        assert!(text.contains("--sourcemap "));
        assert!(text.contains("(required)"));
    }
}
