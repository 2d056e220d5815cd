//! bundle::sourcemap
//!
//! Sourcemap post-processing after Hermes.
//!
//! When both the packager and Hermes emitted maps, the final
//! `sourcemaps/<bundle>.map` is the composition of the two so stack traces
//! of byte code resolve back to original sources.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::hermes::move_file;
use super::process::run_streaming;
use super::project::ReactNativeProject;
use super::workspace::Workspace;
use super::BundleError;
use crate::ui::output::{self, Verbosity};

/// Step name used in failure messages.
pub const STAGE: &str = "compose-source-maps";

const DEBUG_ID_KEYS: [&str; 2] = ["debugId", "debug_id"];

/// Paths of the maps involved in composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcemapPaths {
    /// `<bundle>.packager.map`
    pub packager: PathBuf,
    /// `<bundle>.hbc.map`
    pub hbc: PathBuf,
    /// `<bundle>.map`
    pub composed: PathBuf,
}

impl SourcemapPaths {
    pub fn new(workspace: &Workspace, bundle_name: &str) -> Self {
        Self {
            packager: workspace.sourcemap_path(&format!("{}.packager.map", bundle_name)),
            hbc: workspace.sourcemap_path(&format!("{}.hbc.map", bundle_name)),
            composed: workspace.sourcemap_path(&format!("{}.map", bundle_name)),
        }
    }
}

/// Compose the packager and Hermes maps into `<bundle>.map`.
///
/// Uses `react-native/scripts/compose-source-maps.js` when the project ships
/// it; otherwise the Hermes map is taken as the final map.
pub async fn compose(
    project: &ReactNativeProject,
    workspace: &Workspace,
    bundle_name: &str,
    cwd: &Path,
    verbosity: Verbosity,
) -> Result<PathBuf, BundleError> {
    let paths = SourcemapPaths::new(workspace, bundle_name);

    if !paths.hbc.exists() {
        return Err(BundleError::Sourcemap(format!(
            "hermes sourcemap missing at {}",
            paths.hbc.display()
        )));
    }

    let has_packager = paths.composed.exists();
    if has_packager {
        move_file(&paths.composed, &paths.packager)?;
    }

    let script = project.package_dir().join("scripts/compose-source-maps.js");
    if has_packager && script.is_file() {
        let node = which::which("node")
            .map_err(|_| BundleError::ToolNotFound("node executable not found in PATH".into()))?;
        let args = [
            script.into_os_string(),
            paths.packager.clone().into_os_string(),
            paths.hbc.clone().into_os_string(),
            "-o".into(),
            paths.composed.clone().into_os_string(),
        ];
        output::info("Composing sourcemaps...", verbosity);
        run_streaming(STAGE, &node, args, cwd, verbosity, |line| {
            output::stderr_line(line, verbosity)
        })
        .await?;
    } else {
        log::debug!("compose script unavailable, using hermes map as final map");
        fs::copy(&paths.hbc, &paths.composed).map_err(|e| {
            BundleError::io(format!("failed to write {}", paths.composed.display()), e)
        })?;
    }

    if has_packager {
        copy_debug_id(&paths.packager, &paths.composed)?;
    }
    Ok(paths.composed)
}

/// Read the debug id carried by a sourcemap document.
pub fn debug_id(map: &Value) -> Option<&str> {
    DEBUG_ID_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .filter(|id| !id.is_empty())
}

/// Copy the debug id of `from` into `to` when `to` has none.
///
/// Returns whether `to` was rewritten. Missing files are a no-op.
pub fn copy_debug_id(from: &Path, to: &Path) -> Result<bool, BundleError> {
    let (Some(source), Some(mut target)) = (read_map(from)?, read_map(to)?) else {
        return Ok(false);
    };
    if debug_id(&target).is_some() {
        return Ok(false);
    }
    let Some(id) = debug_id(&source).map(str::to_owned) else {
        return Ok(false);
    };
    let Some(object) = target.as_object_mut() else {
        return Err(BundleError::Sourcemap(format!(
            "{} is not a JSON object",
            to.display()
        )));
    };
    for key in DEBUG_ID_KEYS {
        object.insert(key.to_string(), Value::String(id.clone()));
    }

    let content = serde_json::to_string(&target)
        .map_err(|e| BundleError::Sourcemap(e.to_string()))?;
    fs::write(to, content)
        .map_err(|e| BundleError::io(format!("failed to write {}", to.display()), e))?;
    log::debug!("copied debug id into {}", to.display());
    Ok(true)
}

fn read_map(path: &Path) -> Result<Option<Value>, BundleError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(BundleError::io(
                format!("failed to read {}", path.display()),
                e,
            ))
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| BundleError::Sourcemap(format!("{}: {}", path.display(), e)))
}
