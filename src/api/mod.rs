//! api
//!
//! HTTP access to the release service.
//!
//! The service speaks JSON over HTTPS. Every endpoint the CLI uses is
//! listed in [`endpoints`]; request bodies live in [`types`].

mod client;
pub mod endpoints;
mod errors;
pub mod types;

pub use client::{ApiClient, Credential};
pub use errors::ApiError;
