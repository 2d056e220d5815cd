//! bundle::hermes
//!
//! Hermes byte-code compilation.
//!
//! # Compiler lookup
//!
//! Candidates are probed in order and the first existing executable wins:
//!
//! 1. the explicit `--hermesc-path`
//! 2. `<react-native>/sdks/hermesc/<os>/hermesc`
//! 3. `node_modules/hermes-compiler/hermesc/<os>/hermesc`
//! 4. `node_modules/hermes-engine/<os>/hermesc`
//! 5. `node_modules/hermesvm/<os>/hermes`
//!
//! React Native below 0.63 ships the compiler as `hermes` rather than
//! `hermesc`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use semver::Version;

use super::process::run_streaming;
use super::project::ReactNativeProject;
use super::workspace::Workspace;
use super::BundleError;
use crate::ui::output::{self, Verbosity};

/// Step name used in failure messages.
pub const STAGE: &str = "hermes";

/// Log file receiving full compiler output with `--hermes-logs`.
pub const LOG_FILE: &str = "output.log";

const WARNING_SUMMARY: &str = "Hermes command executed successfully with some warnings. \
If you need full logs, use the --hermes-logs command.";

/// Platform directory of the prebuilt compilers.
pub fn os_bin_dir() -> &'static str {
    if cfg!(target_os = "macos") {
        "osx-bin"
    } else if cfg!(windows) {
        "win64-bin"
    } else {
        "linux64-bin"
    }
}

/// Compiler executable name for a React Native version.
pub fn compiler_name(version: Option<&Version>) -> &'static str {
    match version {
        Some(v) if *v < Version::new(0, 63, 0) => "hermes",
        _ => "hermesc",
    }
}

fn executable(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// Probe locations, most specific first, excluding an explicit path.
pub fn candidates(project: &ReactNativeProject) -> Vec<PathBuf> {
    let os = os_bin_dir();
    let compiler = executable(compiler_name(project.semver().as_ref()));
    let node_modules = project.node_modules();

    vec![
        project.package_dir().join("sdks/hermesc").join(os).join(&compiler),
        node_modules
            .join("hermes-compiler/hermesc")
            .join(os)
            .join(&compiler),
        node_modules.join("hermes-engine").join(os).join(&compiler),
        node_modules
            .join("hermesvm")
            .join(os)
            .join(executable("hermes")),
    ]
}

/// Find the compiler to run.
pub fn locate(
    project: &ReactNativeProject,
    explicit: Option<&Path>,
) -> Result<PathBuf, BundleError> {
    if let Some(path) = explicit {
        if is_executable(path) {
            return Ok(path.to_path_buf());
        }
        return Err(BundleError::ToolNotFound(format!(
            "Hermes compiler not found at {}",
            path.display()
        )));
    }

    let probed = candidates(project);
    if let Some(found) = probed.iter().find(|p| is_executable(p)) {
        log::debug!("using hermes compiler {}", found.display());
        return Ok(found.clone());
    }

    let listing = probed
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Err(BundleError::ToolNotFound(format!(
        "Hermes compiler not found. Looked in:\n{}",
        listing
    )))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Settings of one compilation.
#[derive(Debug, Clone)]
pub struct HermesOptions {
    pub compiler: PathBuf,
    pub sourcemap: bool,
    /// Append full compiler stderr to [`LOG_FILE`] in the working directory.
    pub full_logs: bool,
}

/// Compile the bundle in place.
///
/// On success the bundle file holds byte code. With sourcemaps the compiler
/// map is moved to `sourcemaps/<bundle>.hbc.map`, whose path is returned.
pub async fn compile(
    workspace: &Workspace,
    bundle_name: &str,
    options: &HermesOptions,
    cwd: &Path,
    verbosity: Verbosity,
) -> Result<Option<PathBuf>, BundleError> {
    let bundle = workspace.bundle_path(bundle_name);
    let compiled = workspace.bundle_path(&format!("{}.hbc", bundle_name));

    let mut args = vec![
        "-emit-binary".into(),
        "-out".into(),
        compiled.clone().into_os_string(),
        bundle.clone().into_os_string(),
    ];
    if options.sourcemap {
        args.push("-output-source-map".into());
    }

    let mut log_file = if options.full_logs {
        open_log(&cwd.join(LOG_FILE))
    } else {
        None
    };
    let mut warned = false;

    output::info("Compiling with Hermes...", verbosity);
    run_streaming(STAGE, &options.compiler, args, cwd, verbosity, |line| {
        if !warned {
            warned = true;
            output::warn(WARNING_SUMMARY, verbosity);
        }
        if let Some(file) = log_file.as_mut() {
            if let Err(e) = writeln!(file, "{}", line) {
                log::debug!("failed to write hermes log: {}", e);
            }
        }
    })
    .await?;

    fs::copy(&compiled, &bundle).map_err(|e| {
        BundleError::io(format!("failed to replace {} with byte code", bundle.display()), e)
    })?;
    fs::remove_file(&compiled)
        .map_err(|e| BundleError::io(format!("failed to remove {}", compiled.display()), e))?;

    if !options.sourcemap {
        return Ok(None);
    }

    let produced = workspace.bundle_path(&format!("{}.hbc.map", bundle_name));
    let target = workspace.sourcemap_path(&format!("{}.hbc.map", bundle_name));
    if !produced.exists() {
        log::debug!("hermes produced no sourcemap at {}", produced.display());
        return Ok(None);
    }
    move_file(&produced, &target)?;
    Ok(Some(target))
}

fn open_log(path: &Path) -> Option<File> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("cannot open {}: {}", path.display(), e);
            None
        }
    }
}

/// Rename, falling back to copy and delete across filesystems.
pub(crate) fn move_file(from: &Path, to: &Path) -> Result<(), BundleError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| {
        BundleError::io(
            format!("failed to move {} to {}", from.display(), to.display()),
            e,
        )
    })?;
    fs::remove_file(from)
        .map_err(|e| BundleError::io(format!("failed to remove {}", from.display()), e))
}
