//! engine::registry
//!
//! Static command descriptors and the registry that owns them.
//!
//! # Design
//!
//! Each command declares a [`CommandDescriptor`] constant: its name, alias,
//! options, whether it needs a verified session, whether a `--ci-token`
//! may stand in for that session, and a constructor for its handler. The
//! registry is filled once at startup and only read afterwards.

use thiserror::Error;

use super::command::CommandHandler;
use super::options::OptionMap;

/// How an option takes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// `--name <value>`
    Value,
    /// `--name` (optionally `--name false`)
    Flag,
}

/// Declaration of a single command-line option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// kebab-case flag name, without dashes.
    pub name: &'static str,
    /// Help text.
    pub description: &'static str,
    /// Whether the command refuses to run without it.
    pub required: bool,
    /// Value or flag.
    pub kind: OptionKind,
    /// Value used when the option is omitted.
    pub default: Option<&'static str>,
}

impl OptionDescriptor {
    /// A required `--name <value>` option.
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: true,
            kind: OptionKind::Value,
            default: None,
        }
    }

    /// An optional `--name <value>` option.
    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: false,
            kind: OptionKind::Value,
            default: None,
        }
    }

    /// An optional presence flag.
    pub const fn flag(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: false,
            kind: OptionKind::Flag,
            default: None,
        }
    }

    /// Attach a default value.
    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Declaration of a command.
#[derive(Clone, Copy)]
pub struct CommandDescriptor {
    /// Unique lowercase name.
    pub name: &'static str,
    /// One-line description for `help`.
    pub description: &'static str,
    /// Optional short alias.
    pub alias: Option<&'static str>,
    /// Options in display order.
    pub options: &'static [OptionDescriptor],
    /// Whether a verified session is needed before the handler runs.
    pub requires_session: bool,
    /// Whether `--ci-token` replaces the session check.
    pub supports_ci_token_bypass: bool,
    /// Handler constructor.
    pub handler: fn() -> Box<dyn CommandHandler>,
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("options", &self.options.len())
            .field("requires_session", &self.requires_session)
            .field("supports_ci_token_bypass", &self.supports_ci_token_bypass)
            .finish()
    }
}

impl CommandDescriptor {
    /// Check whether `name` is this command's name or alias.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.alias == Some(name)
    }

    /// Flags of required options that have no usable value.
    pub fn missing_required(&self, options: &OptionMap) -> Vec<String> {
        self.options
            .iter()
            .filter(|opt| opt.required && !options.has_value(opt.name))
            .map(|opt| format!("--{}", opt.name))
            .collect()
    }

    /// Fill in declared defaults for options that were not given.
    pub fn apply_defaults(&self, options: &mut OptionMap) {
        for opt in self.options {
            if let Some(default) = opt.default {
                if options.get(opt.name).is_none() {
                    options.insert(opt.name, super::options::OptionValue::Text(default.into()));
                }
            }
        }
    }
}

/// Registration failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command '{0}' is already registered")]
    DuplicateName(String),

    #[error("alias '{alias}' of '{command}' is already taken")]
    DuplicateAlias { alias: String, command: String },

    #[error("command '{command}' declares option '--{option}' twice")]
    DuplicateOption { command: String, option: String },
}

/// The set of commands known to this process.
#[derive(Debug, Default)]
pub struct Registry {
    commands: Vec<CommandDescriptor>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command.
    ///
    /// Names and aliases share one namespace and must be unique. Option
    /// names must be unique within the command.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        if self.get(descriptor.name).is_some() {
            return Err(RegistryError::DuplicateName(descriptor.name.to_string()));
        }
        if let Some(alias) = descriptor.alias {
            if self.get(alias).is_some() || alias == descriptor.name {
                return Err(RegistryError::DuplicateAlias {
                    alias: alias.to_string(),
                    command: descriptor.name.to_string(),
                });
            }
        }
        for (i, opt) in descriptor.options.iter().enumerate() {
            if descriptor.options[..i].iter().any(|o| o.name == opt.name) {
                return Err(RegistryError::DuplicateOption {
                    command: descriptor.name.to_string(),
                    option: opt.name.to_string(),
                });
            }
        }
        self.commands.push(descriptor);
        Ok(())
    }

    /// Look up a command by name or alias.
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.matches(name))
    }

    /// All commands in registration order.
    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }
}

/// Check that `name` looks like a command at all.
pub fn is_legal_command_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    }
}
