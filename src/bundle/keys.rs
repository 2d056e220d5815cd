//! bundle::keys
//!
//! RSA key pairs for bundle signing.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand_core::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

use super::BundleError;

/// Modulus size of generated keys.
pub const KEY_BITS: usize = 2048;

pub const PRIVATE_KEY_FILE: &str = "private-key.pem";
pub const PUBLIC_KEY_FILE: &str = "public-key.pem";

const PRIVATE_KEY_MODE: u32 = 0o600;
const PUBLIC_KEY_MODE: u32 = 0o644;

/// A PEM encoded key pair.
pub struct PemKeyPair {
    /// PKCS#8 private key.
    pub private_pem: String,
    /// SubjectPublicKeyInfo public key.
    pub public_pem: String,
}

/// Generate a fresh key pair in memory.
pub fn generate_pem_pair(bits: usize) -> Result<PemKeyPair, BundleError> {
    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| BundleError::KeyGeneration(e.to_string()))?;
    let public = RsaPublicKey::from(&private);

    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| BundleError::KeyGeneration(e.to_string()))?;
    let public_pem = public
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| BundleError::KeyGeneration(e.to_string()))?;

    Ok(PemKeyPair {
        private_pem: private_pem.to_string(),
        public_pem,
    })
}

/// Write a new key pair into `dir`, creating it as needed.
///
/// Returns the private and public key paths.
pub fn generate_key_pair(dir: &Path) -> Result<(PathBuf, PathBuf), BundleError> {
    let pair = generate_pem_pair(KEY_BITS)?;

    fs::create_dir_all(dir)
        .map_err(|e| BundleError::io(format!("failed to create {}", dir.display()), e))?;

    let private_path = dir.join(PRIVATE_KEY_FILE);
    let public_path = dir.join(PUBLIC_KEY_FILE);
    write_key(&private_path, &pair.private_pem, PRIVATE_KEY_MODE)?;
    write_key(&public_path, &pair.public_pem, PUBLIC_KEY_MODE)?;

    Ok((private_path, public_path))
}

/// Write `pem` to `path`, which never holds content under a wider `mode`.
fn write_key(path: &Path, pem: &str, mode: u32) -> Result<(), BundleError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options
        .open(path)
        .map_err(|e| BundleError::io(format!("failed to create {}", path.display()), e))?;

    // An existing file keeps its old mode through open.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(mode))
            .map_err(|e| BundleError::io(format!("failed to restrict {}", path.display()), e))?;
    }

    file.write_all(pem.as_bytes())
        .map_err(|e| BundleError::io(format!("failed to write {}", path.display()), e))
}
