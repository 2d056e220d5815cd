//! secrets::traits
//!
//! Credential storage trait definition.
//!
//! # Design
//!
//! The `TokenStore` trait is a key-value interface over [`TokenEntry`]
//! values. Keys are logical slot names; the CLI session lives in the
//! [`CLI_SLOT`] slot.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include token values in error messages
//! - Be thread-safe (Send + Sync)
//!
//! # Example
//!
//! ```ignore
//! use stallion::secrets::{TokenStore, TokenEntry, CLI_SLOT};
//!
//! fn remember(store: &dyn TokenStore, token: &str) -> Result<(), SecretError> {
//!     store.set(CLI_SLOT, TokenEntry::new(token))
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The slot holding the interactive CLI session token.
pub const CLI_SLOT: &str = "cli";

/// Errors from credential storage operations.
///
/// Note: Error messages intentionally do not include token values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Failed to read from credential storage.
    #[error("failed to read credentials: {0}")]
    ReadError(String),

    /// The credential file exists but is not valid JSON.
    #[error("credential file is malformed: {0}")]
    Malformed(String),

    /// Failed to write to credential storage.
    #[error("failed to write credentials: {0}")]
    WriteError(String),
}

/// A stored credential.
///
/// Serialized as `{ "id": null, "token": "..." }`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// Optional identifier of the account the token belongs to.
    pub id: Option<String>,
    /// The opaque access token.
    pub token: String,
}

impl TokenEntry {
    /// Create an entry with no account id.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            id: None,
            token: token.into(),
        }
    }
}

impl fmt::Debug for TokenEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEntry")
            .field("id", &self.id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Trait for credential storage providers.
pub trait TokenStore: Send + Sync {
    /// Get the entry stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<TokenEntry>, SecretError>;

    /// Store `entry` under `key`, replacing any previous entry.
    fn set(&self, key: &str, entry: TokenEntry) -> Result<(), SecretError>;

    /// Remove the entry under `key`.
    ///
    /// Returns `Ok(())` even if nothing was stored.
    fn remove(&self, key: &str) -> Result<(), SecretError>;

    /// Convenience accessor for the token string alone.
    fn token(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.get(key)?.map(|entry| entry.token))
    }
}
