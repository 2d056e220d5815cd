//! core::paths
//!
//! Well-known locations used by the CLI.
//!
//! # Per-user
//!
//! Everything per-user lives under the profile directory, `~/.stallion`
//! (overridable with `$STALLION_HOME`):
//! - `token-store.json` - stored credentials
//! - `config.toml` - optional configuration
//!
//! # Per-project
//!
//! - `stallion/secret-keys/` - signing key pair written by `generate-key-pair`
//! - `stallion-artifacts/<platform>/<stage>/` - kept bundle artifacts
//! - `stallion-temp-*` - per-run workspaces, swept at exit

use std::path::{Path, PathBuf};

/// Environment variable overriding the profile directory.
pub const HOME_ENV: &str = "STALLION_HOME";

/// Name of the profile directory under the user's home.
pub const PROFILE_DIR_NAME: &str = ".stallion";

/// Credential file name inside the profile directory.
pub const TOKEN_STORE_FILE: &str = "token-store.json";

/// Config file name inside the profile directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Prefix of per-run temporary workspaces.
pub const TEMP_PREFIX: &str = "stallion-temp-";

/// Directory (relative to the working directory) receiving kept artifacts.
pub const ARTIFACTS_DIR: &str = "stallion-artifacts";

/// Project-relative directory receiving the signing key pair.
pub const SECRET_KEYS_DIR: &str = "stallion/secret-keys";

/// Resolve the profile directory.
///
/// Returns `None` only when no override is set and the home directory
/// cannot be determined.
pub fn profile_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|home| home.join(PROFILE_DIR_NAME))
}

/// Artifact directory for a platform and pipeline stage.
pub fn artifacts_dir(cwd: &Path, platform: &str, stage: &str) -> PathBuf {
    cwd.join(ARTIFACTS_DIR).join(platform).join(stage)
}

/// Directory receiving the signing key pair for a project rooted at `cwd`.
pub fn secret_keys_dir(cwd: &Path) -> PathBuf {
    cwd.join(SECRET_KEYS_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifacts_are_keyed_by_platform_and_stage() {
        let dir = artifacts_dir(Path::new("/work"), "android", "hermes");
        assert_eq!(
            dir,
            PathBuf::from("/work/stallion-artifacts/android/hermes")
        );
    }

    #[test]
    fn secret_keys_are_project_relative() {
        assert_eq!(
            secret_keys_dir(Path::new("/app")),
            PathBuf::from("/app/stallion/secret-keys")
        );
    }
}
