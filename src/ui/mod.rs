//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive prompts
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All console output and prompts go through this module so quiet and
//! non-interactive modes are honored everywhere.

pub mod output;
pub mod prompts;
