//! engine::result
//!
//! Command outcomes and the error-code taxonomy.
//!
//! Handlers return `Result<(), CommandError>`. The runner folds that into a
//! [`CommandResult`], and the binary turns a failure into its numeric
//! [`ErrorCode`] as the process exit status.

use std::fmt;

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::bundle::BundleError;
use crate::secrets::SecretError;

/// Numeric error codes, also used as process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Succeeded = 0,
    IllegalCommand = 1,
    NoSuchCommand = 2,
    Exception = 3,
    InvalidParameter = 4,
    NotLoggedIn = 5,
    NotFound = 6,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::Succeeded => "succeeded",
            ErrorCode::IllegalCommand => "illegal command",
            ErrorCode::NoSuchCommand => "no such command",
            ErrorCode::Exception => "exception",
            ErrorCode::InvalidParameter => "invalid parameter",
            ErrorCode::NotLoggedIn => "not logged in",
            ErrorCode::NotFound => "not found",
        };
        f.write_str(name)
    }
}

/// Errors a command can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command text is not a legal command name.
    #[error("{0}")]
    IllegalCommand(String),

    /// No command with that name or alias is registered.
    #[error("{0}")]
    NoSuchCommand(String),

    /// An option is missing or has a bad value.
    #[error("{0}")]
    InvalidParameter(String),

    /// The session could not be established.
    #[error("{0}")]
    NotLoggedIn(String),

    /// A referenced file or resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Anything else.
    #[error("{0:#}")]
    Exception(anyhow::Error),
}

impl CommandError {
    /// The error code this error maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            CommandError::IllegalCommand(_) => ErrorCode::IllegalCommand,
            CommandError::NoSuchCommand(_) => ErrorCode::NoSuchCommand,
            CommandError::InvalidParameter(_) => ErrorCode::InvalidParameter,
            CommandError::NotLoggedIn(_) => ErrorCode::NotLoggedIn,
            CommandError::NotFound(_) => ErrorCode::NotFound,
            CommandError::Exception(_) => ErrorCode::Exception,
        }
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        CommandError::Exception(err)
    }
}

impl From<ApiError> for CommandError {
    fn from(err: ApiError) -> Self {
        CommandError::Exception(err.into())
    }
}

impl From<SecretError> for CommandError {
    fn from(err: SecretError) -> Self {
        CommandError::Exception(err.into())
    }
}

impl From<AuthError> for CommandError {
    fn from(err: AuthError) -> Self {
        CommandError::NotLoggedIn(format!("Login failed: {}", err))
    }
}

impl From<BundleError> for CommandError {
    fn from(err: BundleError) -> Self {
        match err {
            BundleError::NoProject
            | BundleError::InvalidPlatform(_)
            | BundleError::InvalidSigningKey(_) => CommandError::InvalidParameter(err.to_string()),
            BundleError::EntryFileMissing(_) => CommandError::NotFound(err.to_string()),
            other => CommandError::Exception(other.into()),
        }
    }
}

/// Final outcome of dispatching a command.
#[derive(Debug)]
pub enum CommandResult {
    /// The command completed.
    Success,

    /// The command failed or did not run.
    Failure {
        /// Classification of the failure.
        code: ErrorCode,
        /// User-facing message.
        message: String,
        /// Underlying error, when there is one.
        cause: Option<anyhow::Error>,
    },
}

impl CommandResult {
    /// Build a failure without an underlying cause.
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        CommandResult::Failure {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// Check if the command succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success)
    }

    /// The error code (`Succeeded` for success).
    pub fn code(&self) -> ErrorCode {
        match self {
            CommandResult::Success => ErrorCode::Succeeded,
            CommandResult::Failure { code, .. } => *code,
        }
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            CommandResult::Success => None,
            CommandResult::Failure { message, .. } => Some(message),
        }
    }

    /// Process exit status.
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }
}

impl From<Result<(), CommandError>> for CommandResult {
    fn from(result: Result<(), CommandError>) -> Self {
        match result {
            Ok(()) => CommandResult::Success,
            Err(CommandError::Exception(err)) => CommandResult::Failure {
                code: ErrorCode::Exception,
                message: format!("{:#}", err),
                cause: Some(err),
            },
            Err(err) => CommandResult::failure(err.code(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_taxonomy() {
        assert_eq!(ErrorCode::Succeeded.exit_code(), 0);
        assert_eq!(ErrorCode::IllegalCommand.exit_code(), 1);
        assert_eq!(ErrorCode::NoSuchCommand.exit_code(), 2);
        assert_eq!(ErrorCode::Exception.exit_code(), 3);
        assert_eq!(ErrorCode::InvalidParameter.exit_code(), 4);
        assert_eq!(ErrorCode::NotLoggedIn.exit_code(), 5);
        assert_eq!(ErrorCode::NotFound.exit_code(), 6);
    }

    #[test]
    fn success_has_zero_exit() {
        let result = CommandResult::from(Ok(()));
        assert!(result.is_success());
        assert_eq!(result.exit_code(), 0);
        assert!(result.message().is_none());
    }

    #[test]
    fn exception_keeps_cause() {
        let err = anyhow::anyhow!("root cause").context("while archiving");
        let result = CommandResult::from(Err(CommandError::Exception(err)));
        match result {
            CommandResult::Failure {
                code,
                message,
                cause,
            } => {
                assert_eq!(code, ErrorCode::Exception);
                assert!(message.contains("while archiving"));
                assert!(message.contains("root cause"));
                assert!(cause.is_some());
            }
            CommandResult::Success => panic!("expected failure"),
        }
    }

    #[test]
    fn auth_errors_are_not_logged_in() {
        let err: CommandError = AuthError::TokenTooShort { min: 5 }.into();
        assert_eq!(err.code(), ErrorCode::NotLoggedIn);
        assert!(err.to_string().starts_with("Login failed"));
    }

    #[test]
    fn bundle_errors_are_classified() {
        assert_eq!(
            CommandError::from(BundleError::NoProject).code(),
            ErrorCode::InvalidParameter
        );
        assert_eq!(
            CommandError::from(BundleError::EntryFileMissing("app.js".into())).code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            CommandError::from(BundleError::InvalidSignedUrl).code(),
            ErrorCode::Exception
        );
    }
}
