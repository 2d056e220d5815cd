//! bundle::bundler
//!
//! Invocation of the React Native bundler.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::process::run_streaming;
use super::project::{Platform, ReactNativeProject};
use super::BundleError;
use crate::ui::output::{self, Verbosity};

/// Step name used in failure messages.
pub const STAGE: &str = "react-native bundle";

/// Program plus leading arguments that start the bundler.
///
/// The default is `node <react-native>/cli.js`; callers may substitute any
/// executable that understands the `bundle` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlerCommand {
    /// Executable to spawn.
    pub program: PathBuf,
    /// Arguments placed before `bundle`.
    pub prefix: Vec<OsString>,
}

impl BundlerCommand {
    /// Explicit program and prefix.
    pub fn new(program: impl Into<PathBuf>, prefix: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            prefix,
        }
    }

    /// `node` from `PATH` running the project's react-native CLI.
    pub fn detect(project: &ReactNativeProject) -> Result<Self, BundleError> {
        let node = which::which("node")
            .map_err(|_| BundleError::ToolNotFound("node executable not found in PATH".into()))?;
        let cli = project.package_dir().join("cli.js");
        Ok(Self::new(node, vec![cli.into_os_string()]))
    }
}

/// Inputs of one bundler run.
#[derive(Debug, Clone)]
pub struct BundleRequest<'a> {
    pub platform: Platform,
    pub entry_file: &'a str,
    pub bundles_dir: &'a Path,
    /// Packager sourcemap destination, when sourcemaps are requested.
    pub sourcemap_output: Option<PathBuf>,
}

impl BundleRequest<'_> {
    /// Full path of the bundle the bundler writes.
    pub fn bundle_output(&self) -> PathBuf {
        self.bundles_dir.join(self.platform.bundle_name())
    }
}

/// Arguments following the command prefix.
pub fn bundle_args(request: &BundleRequest<'_>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "bundle".into(),
        "--dev".into(),
        "false".into(),
        "--assets-dest".into(),
        request.bundles_dir.as_os_str().to_owned(),
        "--bundle-output".into(),
        request.bundle_output().into_os_string(),
        "--entry-file".into(),
        request.entry_file.into(),
        "--platform".into(),
        request.platform.as_str().into(),
    ];
    if let Some(map) = &request.sourcemap_output {
        args.push("--sourcemap-output".into());
        args.push(map.as_os_str().to_owned());
    }
    args
}

/// Run the bundler to completion in `cwd`.
pub async fn run(
    command: &BundlerCommand,
    request: &BundleRequest<'_>,
    cwd: &Path,
    verbosity: Verbosity,
) -> Result<(), BundleError> {
    let args = command
        .prefix
        .iter()
        .cloned()
        .chain(bundle_args(request));

    output::info("Bundling JavaScript...", verbosity);
    run_streaming(STAGE, &command.program, args, cwd, verbosity, |line| {
        output::stderr_line(line, verbosity)
    })
    .await?;
    log::debug!("bundle written to {}", request.bundle_output().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn args_without_sourcemap() {
        let request = BundleRequest {
            platform: Platform::Ios,
            entry_file: "index.js",
            bundles_dir: Path::new("/w/bundles"),
            sourcemap_output: None,
        };
        assert_eq!(
            strings(&bundle_args(&request)),
            vec![
                "bundle",
                "--dev",
                "false",
                "--assets-dest",
                "/w/bundles",
                "--bundle-output",
                "/w/bundles/main.jsbundle",
                "--entry-file",
                "index.js",
                "--platform",
                "ios",
            ]
        );
    }

    #[test]
    fn sourcemap_output_is_appended() {
        let request = BundleRequest {
            platform: Platform::Android,
            entry_file: "app.js",
            bundles_dir: Path::new("/w/bundles"),
            sourcemap_output: Some(PathBuf::from("/w/sourcemaps/index.android.bundle.map")),
        };
        let args = strings(&bundle_args(&request));
        assert_eq!(
            &args[args.len() - 2..],
            ["--sourcemap-output", "/w/sourcemaps/index.android.bundle.map"]
        );
        assert!(args.contains(&"/w/bundles/index.android.bundle".to_string()));
    }
}
