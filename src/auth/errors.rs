//! auth::errors
//!
//! Authentication error types.
//!
//! # Design
//!
//! Error messages MUST NOT contain tokens. Every variant gives enough
//! context to act on without exposing the credential.
//!
//! # Example
//!
//! ```
//! use stallion::auth::AuthError;
//!
//! let err = AuthError::TokenTooShort { min: 5 };
//! assert!(err.to_string().contains("5"));
//! ```

use thiserror::Error;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session exists and the caller did not allow an interactive login.
    #[error("not logged in. Run 'stallion login'.")]
    NotLoggedIn,

    /// A manually pasted token was empty or implausibly short.
    #[error("invalid token: expected at least {min} characters")]
    TokenTooShort {
        /// Minimum accepted length
        min: usize,
    },

    /// The service rejected the token.
    #[error("token verification failed: {0}")]
    Verification(String),

    /// Every port in the callback range is taken.
    #[error("no free port for the login callback in {start}-{end}")]
    NoFreePort {
        /// First port tried
        start: u16,
        /// Last port tried
        end: u16,
    },

    /// The browser never called back.
    #[error("timed out waiting for the browser login to complete")]
    CallbackTimeout,

    /// The callback server stopped without delivering a token.
    #[error("login callback server error: {0}")]
    CallbackServer(String),

    /// The user pressed Ctrl-C at the token prompt.
    #[error("login interrupted")]
    Interrupted,

    /// Neither login strategy is available.
    #[error("login requires an interactive terminal or a browser callback")]
    NoStrategy,

    /// Error from credential storage.
    #[error("credential store error: {0}")]
    SecretStore(String),

    /// Internal error (should not happen).
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl From<crate::secrets::SecretError> for AuthError {
    fn from(err: crate::secrets::SecretError) -> Self {
        AuthError::SecretStore(err.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::Internal(format!("IO error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_free_port_names_range() {
        let msg = AuthError::NoFreePort {
            start: 3001,
            end: 3100,
        }
        .to_string();
        assert!(msg.contains("3001-3100"));
    }

    #[test]
    fn secret_errors_convert() {
        let err: AuthError = crate::secrets::SecretError::WriteError("disk".into()).into();
        assert!(matches!(err, AuthError::SecretStore(_)));
    }
}
