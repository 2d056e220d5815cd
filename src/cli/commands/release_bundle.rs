//! cli::commands::release_bundle
//!
//! Promote an uploaded bundle to an app version.

use async_trait::async_trait;

use crate::api::types::PromoteBundleRequest;
use crate::engine::{
    CommandContext, CommandDescriptor, CommandError, CommandHandler, OptionDescriptor, OptionMap,
};
use crate::ui::output;

const OPTIONS: &[OptionDescriptor] = &[
    OptionDescriptor::required("project-id", "Project id"),
    OptionDescriptor::required("hash", "Hash of the uploaded bundle"),
    OptionDescriptor::required("app-version", "App version the bundle targets"),
    OptionDescriptor::required("release-note", "Release note"),
    OptionDescriptor::required("ci-token", "CI token"),
    OptionDescriptor::flag("is-mandatory", "Mark the release as mandatory"),
    OptionDescriptor::flag("is-paused", "Create the release paused"),
];

pub const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
    name: "release-bundle",
    description: "Release an uploaded bundle to an app version",
    alias: Some("rb"),
    options: OPTIONS,
    requires_session: false,
    supports_ci_token_bypass: true,
    handler,
};

pub struct ReleaseBundle;

fn handler() -> Box<dyn CommandHandler> {
    Box::new(ReleaseBundle)
}

pub fn request_body(options: &OptionMap) -> PromoteBundleRequest {
    let text = |key: &str| options.text(key).unwrap_or_default().to_string();
    PromoteBundleRequest {
        project_id: text("project-id"),
        hash: text("hash"),
        app_version: text("app-version"),
        release_note: text("release-note"),
        is_mandatory: options.flag("is-mandatory"),
        is_paused: options.flag("is-paused"),
    }
}

#[async_trait]
impl CommandHandler for ReleaseBundle {
    async fn execute(&self, cx: &CommandContext<'_>, options: &OptionMap) -> Result<(), CommandError> {
        let body = request_body(options);
        cx.api().promote_bundle(&body).await?;
        output::print(
            format!("Success!, Released bundle {} for app version {}", body.hash, body.app_version),
            cx.ctx.verbosity,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_flags_are_omitted() {
        let options = OptionMap::new()
            .with_text("project-id", "p1")
            .with_text("hash", "abc")
            .with_text("app-version", "1.0.0")
            .with_text("release-note", "note")
            .with_flag("is-mandatory", true);

        let body = request_body(&options);
        assert_eq!(body.is_mandatory, Some(true));
        assert_eq!(body.is_paused, None);
        assert_eq!(body.app_version, "1.0.0");
    }
}
