//! bundle::signing
//!
//! Release signatures.
//!
//! The signature is a JWT (RS256) whose claims carry the package hash of
//! the bundle directory. It is written to [`SIGNATURE_FILE`] inside that
//! directory so it travels with the archive.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::manifest::{compute_package_hash, generate_manifest, SIGNATURE_FILE};
use super::BundleError;

/// Claims of the release signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureClaims {
    #[serde(rename = "packageHash")]
    pub package_hash: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
}

/// Sign the contents of `bundles_dir` with the PEM key at `key_path`.
///
/// Any previous sidecar is replaced. Returns the signed package hash.
pub fn sign_bundle(bundles_dir: &Path, key_path: &Path) -> Result<String, BundleError> {
    let pem = fs::read(key_path).map_err(|e| {
        log::debug!("cannot read signing key: {}", e);
        BundleError::InvalidSigningKey(key_path.to_path_buf())
    })?;
    let key = EncodingKey::from_rsa_pem(&pem).map_err(|e| {
        log::debug!("cannot parse signing key: {}", e);
        BundleError::InvalidSigningKey(key_path.to_path_buf())
    })?;

    let signature_path = bundles_dir.join(SIGNATURE_FILE);
    match fs::remove_file(&signature_path) {
        Ok(()) => log::debug!("removed stale {}", signature_path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(BundleError::io(
                format!("failed to remove {}", signature_path.display()),
                e,
            ))
        }
    }

    let entries = generate_manifest(bundles_dir)?;
    if entries.is_empty() {
        return Err(BundleError::NoFilesToSign);
    }
    let claims = SignatureClaims {
        package_hash: compute_package_hash(&entries),
        iat: chrono::Utc::now().timestamp(),
    };

    let token = encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| BundleError::Signing(e.to_string()))?;
    fs::write(&signature_path, token)
        .map_err(|e| BundleError::Signing(e.to_string()))?;

    log::debug!("signed {} files", entries.len());
    Ok(claims.package_hash)
}
