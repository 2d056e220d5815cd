//! cli::args
//!
//! Command-line parsing.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//!
//! Subcommands are generated from the registry, so the parser and the
//! runner always agree on names, aliases and options. Required options are
//! not enforced by clap: the runner reports them all at once.

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Arg, ArgAction, ArgMatches, Args, Command, FromArgMatches};

use crate::engine::{OptionDescriptor, OptionKind, OptionMap, OptionValue, Registry};
use crate::ui::output::Verbosity;

/// Flags shared by every command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Run as if stallion was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Prompts are shown only on a terminal and never in quiet mode.
    pub fn interactive(&self) -> bool {
        !self.quiet && std::io::stdin().is_terminal()
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub globals: GlobalArgs,
    /// Command name as typed (or canonical, for aliases) and its options.
    /// `None` when no command was given.
    pub command: Option<(String, OptionMap)>,
}

/// Build the clap command tree for `registry`.
pub fn build_command(registry: &Registry) -> Command {
    let mut cmd = Command::new("stallion")
        .about("Package and publish React Native over-the-air updates")
        .version(env!("CARGO_PKG_VERSION"))
        .disable_help_subcommand(true)
        .allow_external_subcommands(true);
    cmd = GlobalArgs::augment_args(cmd);

    for descriptor in registry.commands() {
        let mut sub = Command::new(descriptor.name).about(descriptor.description);
        if let Some(alias) = descriptor.alias {
            sub = sub.visible_alias(alias);
        }
        for opt in descriptor.options {
            sub = sub.arg(option_arg(opt));
        }
        cmd = cmd.subcommand(sub);
    }
    cmd
}

fn option_arg(opt: &OptionDescriptor) -> Arg {
    let arg = Arg::new(opt.name).long(opt.name).help(opt.description);
    match opt.kind {
        OptionKind::Value => arg
            .value_name("VALUE")
            .num_args(1)
            .allow_hyphen_values(true)
            .action(ArgAction::Set),
        OptionKind::Flag => arg
            .value_name("BOOL")
            .num_args(0..=1)
            .default_missing_value("true")
            .value_parser(BoolishValueParser::new())
            .action(ArgAction::Set),
    }
}

/// Parse `argv` (including the program name).
pub fn parse<I, T>(registry: &Registry, argv: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command(registry).try_get_matches_from(argv)?;
    let globals = GlobalArgs::from_arg_matches(&matches)?;

    let command = matches.subcommand().map(|(name, sub)| {
        let options = match registry.get(name) {
            Some(descriptor) => collect_options(descriptor.options, sub),
            None => OptionMap::new(),
        };
        (name.to_string(), options)
    });

    Ok(Invocation { globals, command })
}

fn collect_options(declared: &[OptionDescriptor], matches: &ArgMatches) -> OptionMap {
    let mut options = OptionMap::new();
    for opt in declared {
        match opt.kind {
            OptionKind::Value => {
                if let Some(value) = matches.get_one::<String>(opt.name) {
                    options.insert(opt.name, OptionValue::Text(value.clone()));
                }
            }
            OptionKind::Flag => {
                if let Some(value) = matches.get_one::<bool>(opt.name) {
                    options.insert(opt.name, OptionValue::Flag(*value));
                }
            }
        }
    }
    options
}
