//! auth
//!
//! Session authentication for the release service.
//!
//! # Overview
//!
//! Commands that talk to the service on behalf of a user need a verified
//! session token. [`SessionGate`] loads the token from the credential store,
//! verifies it, and falls back to the interactive [`LoginFlow`] when it is
//! missing or rejected.
//!
//! # Login
//!
//! The login flow opens the console in a browser and races two ways of
//! getting a token back:
//! - a local [`CallbackServer`] on the first free port in 3001-3100
//! - a manual paste in the terminal
//!
//! # Security
//!
//! - Tokens are never logged or included in error messages
//! - The callback server binds to loopback only and accepts one token

pub mod callback_server;
mod errors;
pub mod login;
pub mod session;

pub use callback_server::CallbackServer;
pub use errors::AuthError;
pub use login::{LoginFlow, LoginStrategy, ManualTokenSource};
pub use session::{SessionGate, SessionState};
