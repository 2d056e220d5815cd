//! bundle::workspace
//!
//! Per-run temporary workspace.
//!
//! # Layout
//!
//! ```text
//! <cwd>/stallion-temp-XXXXXX/
//! ├── build.zip
//! └── Stallion/
//!     ├── bundles/      bundle, assets, signature sidecar
//!     └── sourcemaps/   only when sourcemaps are requested
//! ```
//!
//! The workspace is removed when dropped, on success and on failure alike.
//! [`sweep_temp_dirs`] is the exit-time backstop for runs that were killed
//! before their destructor ran.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::BundleError;
use crate::core::paths::TEMP_PREFIX;

/// Temporary directory tree owned by one pipeline run.
#[derive(Debug)]
pub struct Workspace {
    temp: TempDir,
    content_root: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace under `parent`.
    pub fn create(parent: &Path, sourcemaps: bool) -> Result<Self, BundleError> {
        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| BundleError::io("failed to create temporary workspace", e))?;

        let content_root = temp.path().join("Stallion");
        let workspace = Self { temp, content_root };

        create_dir(&workspace.bundles_dir())?;
        if sourcemaps {
            create_dir(&workspace.sourcemaps_dir())?;
        }
        log::debug!("created workspace {}", workspace.root().display());
        Ok(workspace)
    }

    /// Top-level temporary directory.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Directory that gets archived.
    pub fn bundles_dir(&self) -> PathBuf {
        self.content_root.join("bundles")
    }

    /// Directory receiving sourcemaps.
    pub fn sourcemaps_dir(&self) -> PathBuf {
        self.content_root.join("sourcemaps")
    }

    /// Path of the bundle file inside `bundles/`.
    pub fn bundle_path(&self, bundle_name: &str) -> PathBuf {
        self.bundles_dir().join(bundle_name)
    }

    /// Path of a sourcemap inside `sourcemaps/`.
    pub fn sourcemap_path(&self, file_name: &str) -> PathBuf {
        self.sourcemaps_dir().join(file_name)
    }

    /// Path of the finished archive.
    pub fn archive_path(&self) -> PathBuf {
        self.root().join("build.zip")
    }

    /// Remove the workspace now, reporting failures.
    pub fn close(self) -> Result<(), BundleError> {
        let root = self.root().to_path_buf();
        self.temp
            .close()
            .map_err(|e| BundleError::io(format!("failed to remove {}", root.display()), e))
    }
}

fn create_dir(path: &Path) -> Result<(), BundleError> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(BundleError::io(
            format!("failed to create {}", path.display()),
            e,
        )),
    }
}

/// Remove leftover workspaces directly under `dir`.
///
/// Best effort: failures are logged, not returned. Returns how many entries
/// were removed.
pub fn sweep_temp_dirs(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("cannot scan {} for temp dirs: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
            continue;
        }
        let path = entry.path();
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::debug!("failed to remove {}: {}", path.display(), e),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layout_is_created() {
        let cwd = TempDir::new().unwrap();
        let ws = Workspace::create(cwd.path(), true).unwrap();

        assert!(ws
            .root()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(TEMP_PREFIX));
        assert!(ws.bundles_dir().is_dir());
        assert!(ws.sourcemaps_dir().is_dir());
        assert_eq!(ws.archive_path(), ws.root().join("build.zip"));
    }

    #[test]
    fn sourcemaps_dir_is_optional() {
        let cwd = TempDir::new().unwrap();
        let ws = Workspace::create(cwd.path(), false).unwrap();
        assert!(!ws.sourcemaps_dir().exists());
    }

    #[test]
    fn drop_removes_workspace() {
        let cwd = TempDir::new().unwrap();
        let root = {
            let ws = Workspace::create(cwd.path(), false).unwrap();
            fs::write(ws.bundle_path("main.jsbundle"), "x").unwrap();
            ws.root().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[test]
    fn names_are_unique() {
        let cwd = TempDir::new().unwrap();
        let a = Workspace::create(cwd.path(), false).unwrap();
        let b = Workspace::create(cwd.path(), false).unwrap();
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn sweep_removes_only_prefixed_entries() {
        let cwd = TempDir::new().unwrap();
        fs::create_dir_all(cwd.path().join("stallion-temp-abc/Stallion")).unwrap();
        fs::write(cwd.path().join("stallion-temp-file"), "x").unwrap();
        fs::create_dir(cwd.path().join("src")).unwrap();

        assert_eq!(sweep_temp_dirs(cwd.path()), 2);
        assert!(cwd.path().join("src").exists());
        assert!(!cwd.path().join("stallion-temp-abc").exists());
    }
}
