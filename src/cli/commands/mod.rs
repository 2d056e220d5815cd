//! cli::commands
//!
//! The built-in commands.
//!
//! Each module declares a `DESCRIPTOR` constant and the handler it builds.
//! [`builtin_registry`] is the single registration table.

pub mod generate_key_pair;
pub mod help;
pub mod login;
pub mod logout;
pub mod publish_bundle;
pub mod release_bundle;
pub mod update_release;

use crate::engine::{CommandDescriptor, Registry, RegistryError};

/// Descriptors in listing order.
pub const BUILTIN: &[CommandDescriptor] = &[
    login::DESCRIPTOR,
    logout::DESCRIPTOR,
    publish_bundle::DESCRIPTOR,
    release_bundle::DESCRIPTOR,
    update_release::DESCRIPTOR,
    generate_key_pair::DESCRIPTOR,
    help::DESCRIPTOR,
];

/// Registry holding every built-in command.
pub fn builtin_registry() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    for descriptor in BUILTIN {
        registry.register(*descriptor)?;
    }
    Ok(registry)
}
