//! bundle::artifacts
//!
//! Caller-visible snapshots of intermediate pipeline output.
//!
//! Snapshots live in `<cwd>/stallion-artifacts/<platform>/<stage>` and are
//! replaced on every run. Optional inputs that do not exist are skipped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::project::Platform;
use super::sourcemap::SourcemapPaths;
use super::workspace::Workspace;
use super::BundleError;
use crate::core::paths;

/// Pipeline stage a snapshot was taken after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStage {
    /// Right after the bundler.
    Normal,
    /// After Hermes compilation.
    Hermes,
}

impl SnapshotStage {
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotStage::Normal => "normal",
            SnapshotStage::Hermes => "hermes",
        }
    }
}

/// Copy the current workspace output for `stage`.
///
/// `normal` receives the whole bundle directory (bundle and assets) plus the
/// packager map. `hermes` receives the compiled bundle, the Hermes map and
/// the composed map.
pub fn snapshot(
    cwd: &Path,
    platform: Platform,
    stage: SnapshotStage,
    workspace: &Workspace,
) -> Result<PathBuf, BundleError> {
    let target = paths::artifacts_dir(cwd, platform.as_str(), stage.as_str());
    reset_dir(&target)?;

    let bundle_name = platform.bundle_name();
    match stage {
        SnapshotStage::Normal => {
            copy_tree(&workspace.bundles_dir(), &target)?;
            copy_optional(
                &workspace.sourcemap_path(&format!("{}.map", bundle_name)),
                &target,
            )?;
        }
        SnapshotStage::Hermes => {
            let maps = SourcemapPaths::new(workspace, bundle_name);
            copy_optional(&workspace.bundle_path(bundle_name), &target)?;
            copy_optional(&maps.hbc, &target)?;
            copy_optional(&maps.composed, &target)?;
        }
    }

    log::debug!("snapshot {} written to {}", stage.as_str(), target.display());
    Ok(target)
}

fn reset_dir(dir: &Path) -> Result<(), BundleError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(BundleError::io(
                format!("failed to clear {}", dir.display()),
                e,
            ))
        }
    }
    fs::create_dir_all(dir)
        .map_err(|e| BundleError::io(format!("failed to create {}", dir.display()), e))
}

/// Copy `file` into `dir`, skipping it when absent.
fn copy_optional(file: &Path, dir: &Path) -> Result<(), BundleError> {
    let Some(name) = file.file_name() else {
        return Ok(());
    };
    match fs::copy(file, dir.join(name)) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("skipping missing artifact {}", file.display());
            Ok(())
        }
        Err(e) => Err(BundleError::io(
            format!("failed to copy {}", file.display()),
            e,
        )),
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), BundleError> {
    if !from.exists() {
        return Ok(());
    }
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(|e| {
            BundleError::io(format!("failed to walk {}", from.display()), e.into())
        })?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let dest = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
                .map_err(|e| BundleError::io(format!("failed to create {}", dest.display()), e))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| {
                BundleError::io(format!("failed to copy {}", entry.path().display()), e)
            })?;
        }
    }
    Ok(())
}
