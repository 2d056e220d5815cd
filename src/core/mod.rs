//! core
//!
//! Configuration and well-known paths shared by every layer.

pub mod config;
pub mod paths;
