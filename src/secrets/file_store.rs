//! secrets::file_store
//!
//! JSON file-backed credential storage.
//!
//! # Storage
//!
//! - Credentials live in `~/.stallion/token-store.json`
//! - The file is a JSON object keyed by slot name
//! - It is loaded lazily on first access and cached for the life of the store
//! - Every mutation rewrites the whole file
//! - File permissions are set to 0600 on Unix (owner read/write only)
//!
//! Two processes writing at the same time can clobber each other. There is
//! no locking.
//!
//! # Example
//!
//! ```ignore
//! use stallion::secrets::{FileTokenStore, TokenEntry, TokenStore, CLI_SLOT};
//!
//! let store = FileTokenStore::new()?;
//! store.set(CLI_SLOT, TokenEntry::new("..."))?;
//! ```

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, TokenEntry, TokenStore};
use crate::core::paths;

type Entries = BTreeMap<String, TokenEntry>;

/// File-based credential storage.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cache: Mutex<Option<Entries>>,
}

impl FileTokenStore {
    /// Create a store at the default location under the profile directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile directory cannot be determined.
    pub fn new() -> Result<Self, SecretError> {
        let dir = paths::profile_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        Ok(Self::with_path(dir.join(paths::TOKEN_STORE_FILE)))
    }

    /// Create a store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            cache: Mutex::new(None),
        }
    }

    /// Get the path to the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries, SecretError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => {
                return Err(SecretError::ReadError(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| SecretError::Malformed(e.to_string()))
    }

    fn flush(&self, entries: &Entries) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            match fs::create_dir_all(parent) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    return Err(SecretError::WriteError(format!(
                        "cannot create directory: {}",
                        e
                    )))
                }
            }
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| SecretError::WriteError(format!("cannot serialize credentials: {}", e)))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| SecretError::WriteError(format!("cannot open credential file: {}", e)))?;

        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| SecretError::WriteError(format!("cannot set permissions: {}", e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| SecretError::WriteError(format!("cannot write credentials: {}", e)))?;

        Ok(())
    }

    /// Run `f` against the cached entries, loading them first if needed.
    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut Entries) -> Result<T, SecretError>,
    ) -> Result<T, SecretError> {
        let mut guard = self
            .cache
            .lock()
            .map_err(|_| SecretError::ReadError("credential cache lock poisoned".into()))?;
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        match guard.as_mut() {
            Some(entries) => f(entries),
            None => Err(SecretError::ReadError("credential cache not loaded".into())),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<TokenEntry>, SecretError> {
        self.with_entries(|entries| Ok(entries.get(key).cloned()))
    }

    fn set(&self, key: &str, entry: TokenEntry) -> Result<(), SecretError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), entry);
            self.flush(entries)
        })
    }

    fn remove(&self, key: &str) -> Result<(), SecretError> {
        self.with_entries(|entries| {
            entries.remove(key);
            self.flush(entries)
        })
    }
}
