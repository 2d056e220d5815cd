//! cli::commands::publish_bundle
//!
//! Build, sign and upload a bundle.
//!
//! Needs a verified session unless `--ci-token` is given. Project, platform
//! and entry file are checked first so a misconfigured run fails before
//! any login or upload.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::bundle::{self, project, Platform, PublishOptions, ReactNativeProject};
use crate::engine::{
    CommandContext, CommandDescriptor, CommandError, CommandHandler, Context, OptionDescriptor,
    OptionMap,
};
use crate::ui::output;

const OPTIONS: &[OptionDescriptor] = &[
    OptionDescriptor::required("upload-path", "Bucket path to upload to"),
    OptionDescriptor::required("platform", "Target platform: android or ios"),
    OptionDescriptor::required("release-note", "Release note for this bundle"),
    OptionDescriptor::flag("hermes-disabled", "Skip Hermes byte-code compilation"),
    OptionDescriptor::optional("ci-token", "CI token used instead of the login session"),
    OptionDescriptor::optional("entry-file", "Bundler entry file (default index.js)"),
    OptionDescriptor::flag("hermes-logs", "Write full Hermes output to output.log"),
    OptionDescriptor::optional("private-key", "PEM private key used to sign the bundle"),
    OptionDescriptor::optional("hermesc-path", "Hermes compiler to use"),
    OptionDescriptor::flag("sourcemap", "Generate sourcemaps"),
    OptionDescriptor::flag("keep-artifacts", "Keep build output in stallion-artifacts"),
];

pub const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
    name: "publish-bundle",
    description: "Bundle, sign and publish a new version",
    alias: Some("pb"),
    options: OPTIONS,
    requires_session: true,
    supports_ci_token_bypass: true,
    handler,
};

pub struct PublishBundle;

fn handler() -> Box<dyn CommandHandler> {
    Box::new(PublishBundle)
}

/// Map parsed options onto pipeline inputs.
pub fn publish_options(options: &OptionMap) -> Result<PublishOptions, CommandError> {
    let platform: Platform = options.text("platform").unwrap_or_default().parse()?;
    let mut publish = PublishOptions::new(
        platform,
        options.text("upload-path").unwrap_or_default(),
        options.text("release-note").unwrap_or_default(),
    );
    publish.entry_file = options.text("entry-file").map(str::to_owned);
    publish.hermes_disabled = options.is_set("hermes-disabled");
    publish.hermes_logs = options.is_set("hermes-logs");
    publish.hermesc_path = options.text("hermesc-path").map(PathBuf::from);
    publish.private_key = options.text("private-key").map(PathBuf::from);
    publish.sourcemap = options.is_set("sourcemap");
    publish.keep_artifacts = options.is_set("keep-artifacts");
    Ok(publish)
}

#[async_trait]
impl CommandHandler for PublishBundle {
    fn preflight(&self, ctx: &Context, options: &OptionMap) -> Result<(), CommandError> {
        ReactNativeProject::require(&ctx.cwd)?;
        let publish = publish_options(options)?;
        project::resolve_entry_file(&ctx.cwd, publish.entry_file.as_deref())?;
        Ok(())
    }

    async fn execute(&self, cx: &CommandContext<'_>, options: &OptionMap) -> Result<(), CommandError> {
        let publish = publish_options(options)?;
        let verbosity = cx.ctx.verbosity;

        let hash = bundle::publish(&cx.ctx.cwd, &publish, &cx.api(), verbosity).await?;

        output::print("Success!, Published new version", verbosity);
        output::print(format!("Published bundle hash: {}", hash), verbosity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ErrorCode;

    #[test]
    fn options_are_mapped() {
        let options = OptionMap::new()
            .with_text("upload-path", "/V1/Prod")
            .with_text("platform", "IOS")
            .with_text("release-note", "fix")
            .with_flag("sourcemap", true)
            .with_text("keep-artifacts", "false")
            .with_text("private-key", "keys/private.pem");

        let publish = publish_options(&options).unwrap();
        assert_eq!(publish.platform, Platform::Ios);
        assert_eq!(publish.upload_path, "/V1/Prod");
        assert!(publish.sourcemap);
        assert!(!publish.keep_artifacts);
        assert!(!publish.hermes_disabled);
        assert_eq!(publish.private_key, Some(PathBuf::from("keys/private.pem")));
        assert_eq!(publish.entry_file, None);
    }

    #[test]
    fn preflight_requires_a_project() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = Context::new(dir.path());
        let options = OptionMap::new()
            .with_text("upload-path", "/v1")
            .with_text("platform", "android")
            .with_text("release-note", "fix");

        let err = PublishBundle.preflight(&ctx, &options).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        assert_eq!(
            err.to_string(),
            "No react native project found in current directory"
        );
    }

    #[test]
    fn unknown_platform_is_invalid_parameter() {
        let options = OptionMap::new()
            .with_text("upload-path", "/v1")
            .with_text("platform", "windows")
            .with_text("release-note", "fix");

        let err = publish_options(&options).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        assert_eq!(err.to_string(), "Platform must be \"android\" or \"ios\".");
    }
}
