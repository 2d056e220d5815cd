//! bundle::manifest
//!
//! Deterministic package manifest.
//!
//! Every file under the bundle directory contributes one `path:sha256`
//! entry. Entries are sorted before hashing, so the package hash depends
//! only on file names and contents, never on enumeration order.

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use super::BundleError;

/// Signature sidecar written next to the bundle.
pub const SIGNATURE_FILE: &str = ".codepushrelease";

/// Whether a relative path is excluded from the manifest.
pub fn is_ignored(relative: &str) -> bool {
    let file_name = relative.rsplit('/').next().unwrap_or(relative);
    relative.starts_with("__MACOSX/")
        || relative.contains("/__MACOSX/")
        || file_name == ".DS_Store"
        || file_name == SIGNATURE_FILE
}

/// SHA-256 of a file as lowercase hex.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Sorted `path:hash` entries for every file under `dir`.
pub fn generate_manifest(dir: &Path) -> Result<Vec<String>, BundleError> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(|e| {
            BundleError::io(format!("failed to walk {}", dir.display()), e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if is_ignored(&relative) {
            continue;
        }
        let hash = hash_file(entry.path()).map_err(|e| {
            BundleError::io(format!("failed to hash {}", entry.path().display()), e)
        })?;
        entries.push(format!("{}:{}", relative, hash));
    }
    entries.sort();
    Ok(entries)
}

/// Reduce manifest entries to the package hash.
///
/// The entries are sorted first and hashed as a compact JSON array.
pub fn compute_package_hash(entries: &[String]) -> String {
    let mut sorted = entries.to_vec();
    sorted.sort();
    // Serializing a Vec<String> cannot fail.
    let json = serde_json::to_string(&sorted).unwrap_or_default();
    hex::encode(Sha256::digest(json.as_bytes()))
}
