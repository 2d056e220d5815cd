//! secrets
//!
//! Credential storage for the CLI session token.
//!
//! # Architecture
//!
//! Credentials are stored through the [`TokenStore`] trait. The only
//! production implementation is [`FileTokenStore`], which keeps a JSON
//! object in `~/.stallion/token-store.json`:
//!
//! ```json
//! { "cli": { "id": null, "token": "..." } }
//! ```
//!
//! # Security
//!
//! - Tokens are **never** logged or included in error messages
//! - The file uses 0600 permissions on Unix

mod file_store;
mod traits;

pub use file_store::FileTokenStore;
pub use traits::{SecretError, TokenEntry, TokenStore, CLI_SLOT};
