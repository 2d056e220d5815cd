//! bundle
//!
//! The packaging pipeline behind `publish-bundle`.
//!
//! # Stages
//!
//! ```text
//! validate -> workspace -> bundler -> [snapshot normal]
//!          -> [hermes -> sourcemaps -> snapshot hermes]
//!          -> [sign] -> archive -> upload -> cleanup
//! ```
//!
//! Stages run strictly in order and the first failure aborts the rest.
//! The workspace is owned by [`publish`] and removed on every return path.

pub mod archive;
pub mod artifacts;
pub mod bundler;
mod errors;
pub mod hermes;
pub mod keys;
pub mod manifest;
pub mod process;
pub mod project;
pub mod signing;
pub mod sourcemap;
pub mod upload;
pub mod workspace;

pub use bundler::BundlerCommand;
pub use errors::BundleError;
pub use project::{is_valid_platform, Platform, ReactNativeProject};
pub use workspace::{sweep_temp_dirs, Workspace};

use std::path::{Path, PathBuf};

use crate::api::ApiClient;
use crate::ui::output::{self, Verbosity};
use artifacts::SnapshotStage;
use bundler::BundleRequest;
use hermes::HermesOptions;
use upload::UploadRequest;

/// Inputs of one publish run.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub platform: Platform,
    pub upload_path: String,
    pub release_note: String,
    pub entry_file: Option<String>,
    pub hermes_disabled: bool,
    pub hermes_logs: bool,
    pub hermesc_path: Option<PathBuf>,
    pub private_key: Option<PathBuf>,
    pub sourcemap: bool,
    pub keep_artifacts: bool,
    /// Replaces `node <react-native>/cli.js` as the bundler.
    pub bundler: Option<BundlerCommand>,
}

impl PublishOptions {
    pub fn new(
        platform: Platform,
        upload_path: impl Into<String>,
        release_note: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            upload_path: upload_path.into(),
            release_note: release_note.into(),
            entry_file: None,
            hermes_disabled: false,
            hermes_logs: false,
            hermesc_path: None,
            private_key: None,
            sourcemap: false,
            keep_artifacts: false,
            bundler: None,
        }
    }

    fn snapshots(&self) -> bool {
        self.keep_artifacts || self.sourcemap
    }
}

/// Build, optionally compile and sign, archive and upload a bundle.
///
/// Returns the hash of the uploaded archive.
pub async fn publish(
    cwd: &Path,
    options: &PublishOptions,
    api: &ApiClient,
    verbosity: Verbosity,
) -> Result<String, BundleError> {
    let project = ReactNativeProject::require(cwd)?;
    let entry_file = project::resolve_entry_file(cwd, options.entry_file.as_deref())?;
    log::debug!(
        "react-native {} at {}",
        project.version,
        project.root.display()
    );

    let bundler = match &options.bundler {
        Some(bundler) => bundler.clone(),
        None => BundlerCommand::detect(&project)?,
    };

    let workspace = Workspace::create(cwd, options.sourcemap)?;
    let bundle_name = options.platform.bundle_name();
    let bundles_dir = workspace.bundles_dir();

    let request = BundleRequest {
        platform: options.platform,
        entry_file: &entry_file,
        bundles_dir: &bundles_dir,
        sourcemap_output: options
            .sourcemap
            .then(|| workspace.sourcemap_path(&format!("{}.map", bundle_name))),
    };
    bundler::run(&bundler, &request, cwd, verbosity).await?;

    if options.snapshots() {
        artifacts::snapshot(cwd, options.platform, SnapshotStage::Normal, &workspace)?;
    }

    if !options.hermes_disabled {
        let compiler = hermes::locate(&project, options.hermesc_path.as_deref())?;
        let hermes_options = HermesOptions {
            compiler,
            sourcemap: options.sourcemap,
            full_logs: options.hermes_logs,
        };
        let hbc_map =
            hermes::compile(&workspace, bundle_name, &hermes_options, cwd, verbosity).await?;
        if hbc_map.is_some() {
            sourcemap::compose(&project, &workspace, bundle_name, cwd, verbosity).await?;
        }
        if options.snapshots() {
            artifacts::snapshot(cwd, options.platform, SnapshotStage::Hermes, &workspace)?;
        }
    }

    if let Some(key) = &options.private_key {
        output::info("Signing bundle...", verbosity);
        signing::sign_bundle(&bundles_dir, &cwd.join(key))?;
    }

    output::info("Archiving bundle...", verbosity);
    let archive_path = workspace.archive_path();
    archive::create_archive(&bundles_dir, &archive_path)?;

    output::info("Uploading bundle...", verbosity);
    let hash = upload::upload(
        api,
        &UploadRequest {
            archive: &archive_path,
            upload_path: &options.upload_path,
            platform: options.platform,
            release_note: &options.release_note,
        },
    )
    .await?;

    if let Err(e) = workspace.close() {
        log::warn!("{}", e);
    }
    Ok(hash)
}
