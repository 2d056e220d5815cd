//! engine
//!
//! Command registry and dispatch.
//!
//! # Architecture
//!
//! The engine sits between the CLI parser and the command handlers:
//!
//! ```text
//! argv -> cli -> Runner::execute -> [validate] -> [session gate] -> handler
//! ```
//!
//! - [`registry`] holds the static command descriptors
//! - [`options`] normalizes flags into one flat map
//! - [`runner`] validates, gates and dispatches
//! - [`result`] defines the error taxonomy and exit codes
//!
//! # Invariants
//!
//! - Required options are checked before any side effect
//! - A session-gated command runs only with a verified session or a CI token
//! - Only the binary converts a result into a process exit code

pub mod command;
pub mod options;
pub mod registry;
pub mod result;
pub mod runner;

pub use command::{CommandContext, CommandHandler};
pub use options::{OptionMap, OptionValue};
pub use registry::{CommandDescriptor, OptionDescriptor, OptionKind, Registry, RegistryError};
pub use result::{CommandError, CommandResult, ErrorCode};
pub use runner::Runner;

use std::path::PathBuf;

use crate::core::config::Config;
use crate::ui::output::Verbosity;

/// Execution context shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory the command operates in.
    pub cwd: PathBuf,
    /// Output verbosity.
    pub verbosity: Verbosity,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// Resolved configuration.
    pub config: Config,
}

impl Context {
    /// Context rooted at `cwd` with default configuration.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            verbosity: Verbosity::Normal,
            interactive: false,
            config: Config::default(),
        }
    }
}
