//! bundle::errors
//!
//! Errors from the packaging pipeline.
//!
//! Every variant that comes from an external step names the step, so a
//! failure reads as "hermes exited with code 2" rather than a bare I/O error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

/// Errors from the bundle pipeline.
#[derive(Debug, Error)]
pub enum BundleError {
    /// No `react-native` package was found above the working directory.
    #[error("No react native project found in current directory")]
    NoProject,

    /// Platform is not android or ios.
    #[error("Platform must be \"android\" or \"ios\".")]
    InvalidPlatform(String),

    /// The explicit entry file is missing or a directory.
    #[error("Entry file \"{0}\" does not exist.")]
    EntryFileMissing(String),

    /// A required executable could not be located.
    #[error("{0}")]
    ToolNotFound(String),

    /// An external step could not be started.
    #[error("failed to start {stage}: {source}")]
    Spawn {
        /// Pipeline step
        stage: &'static str,
        /// Underlying error
        source: io::Error,
    },

    /// An external step exited unsuccessfully.
    #[error("\"{stage}\" command failed (exitCode={}, signal={})", fmt_opt(.code), fmt_opt(.signal))]
    ProcessFailed {
        /// Pipeline step
        stage: &'static str,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Terminating signal, if any
        signal: Option<i32>,
    },

    /// Filesystem failure during a step.
    #[error("{context}: {source}")]
    Io {
        /// What was being done
        context: String,
        /// Underlying error
        source: io::Error,
    },

    /// The signing key could not be read.
    #[error("The path specified for the signing key (\"{}\") was not valid.", .0.display())]
    InvalidSigningKey(PathBuf),

    /// The bundle directory holds nothing to sign.
    #[error("Error: Can't sign the release because no files were found.")]
    NoFilesToSign,

    /// The signature could not be produced.
    #[error("Error signing bundle: {0}")]
    Signing(String),

    /// Sourcemap post-processing failed.
    #[error("sourcemap error: {0}")]
    Sourcemap(String),

    /// The archive could not be written.
    #[error("failed to archive bundle: {0}")]
    Archive(String),

    /// The archive path is missing or is not a zip.
    #[error("Invalid path or not a valid zip file.")]
    InvalidArchive,

    /// The service returned no upload URL.
    #[error("Internal Error: invalid signed url")]
    InvalidSignedUrl,

    /// Storage rejected the pre-signed upload.
    #[error("Error uploading bundle. Signature does not match.")]
    SignatureMismatch,

    /// Key pair generation failed.
    #[error("failed to generate key pair: {0}")]
    KeyGeneration(String),

    /// A network step of the upload failed.
    #[error("{stage} failed: {source}")]
    Upload {
        /// Upload step
        stage: &'static str,
        /// Underlying error
        source: ApiError,
    },
}

impl BundleError {
    /// Wrap an I/O error with a description of the failed operation.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        BundleError::Io {
            context: context.into(),
            source,
        }
    }
}

fn fmt_opt(value: &Option<i32>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}
