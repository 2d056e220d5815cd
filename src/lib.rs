//! Stallion - package and publish React Native over-the-air updates
//!
//! Stallion builds a React Native bundle, optionally compiles it to Hermes
//! byte code and signs it, then uploads the archive to the Stallion release
//! service. Uploaded bundles can be released to an app version and their
//! rollout adjusted afterwards.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Registry, option validation, session gate and dispatch
//! - [`bundle`] - The packaging pipeline: bundler, Hermes, signing, upload
//! - [`auth`] - Session state machine and the browser login flow
//! - [`api`] - Client for the release service
//! - [`secrets`] - Credential storage
//! - [`core`] - Configuration and per-user paths
//! - [`ui`] - Console output and prompts
//!
//! # Correctness Invariants
//!
//! 1. Required options are checked before any network or filesystem effect
//! 2. Session-gated commands run only with a verified session or a CI token
//! 3. Every publish run removes its temporary workspace, on failure too
//! 4. Only the binary converts a result into a process exit code

pub mod api;
pub mod auth;
pub mod bundle;
pub mod cli;
pub mod core;
pub mod engine;
pub mod secrets;
pub mod ui;
