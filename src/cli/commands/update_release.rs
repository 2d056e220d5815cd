//! cli::commands::update_release
//!
//! Change flags or rollout of an existing release.

use async_trait::async_trait;

use crate::api::types::UpdateReleaseRequest;
use crate::engine::{
    CommandContext, CommandDescriptor, CommandError, CommandHandler, OptionDescriptor, OptionMap,
};
use crate::ui::output;

const OPTIONS: &[OptionDescriptor] = &[
    OptionDescriptor::required("project-id", "Project id"),
    OptionDescriptor::required("hash", "Hash of the released bundle"),
    OptionDescriptor::required("ci-token", "CI token"),
    OptionDescriptor::flag("is-mandatory", "Mark the release as mandatory"),
    OptionDescriptor::flag("is-paused", "Pause or resume the release"),
    OptionDescriptor::flag("is-rolled-back", "Roll the release back"),
    OptionDescriptor::optional("rollout-percent", "Share of installs receiving the release (0-100)"),
    OptionDescriptor::optional("release-note", "New release note"),
];

pub const DESCRIPTOR: CommandDescriptor = CommandDescriptor {
    name: "update-release",
    description: "Update an existing release",
    alias: Some("ur"),
    options: OPTIONS,
    requires_session: false,
    supports_ci_token_bypass: true,
    handler,
};

pub struct UpdateRelease;

fn handler() -> Box<dyn CommandHandler> {
    Box::new(UpdateRelease)
}

/// Parse `--rollout-percent` as an integer in `0..=100`.
pub fn parse_rollout_percent(raw: &str) -> Result<u8, CommandError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| {
            CommandError::InvalidParameter(format!(
                "Rollout percent must be an integer between 0 and 100, got \"{}\"",
                raw
            ))
        })
}

pub fn request_body(options: &OptionMap) -> Result<UpdateReleaseRequest, CommandError> {
    let rollout_percent = options
        .text("rollout-percent")
        .map(parse_rollout_percent)
        .transpose()?;

    Ok(UpdateReleaseRequest {
        project_id: options.text("project-id").unwrap_or_default().to_string(),
        hash: options.text("hash").unwrap_or_default().to_string(),
        release_note: options.text("release-note").map(str::to_owned),
        is_mandatory: options.flag("is-mandatory"),
        is_paused: options.flag("is-paused"),
        is_rolled_back: options.flag("is-rolled-back"),
        rollout_percent,
    })
}

#[async_trait]
impl CommandHandler for UpdateRelease {
    async fn execute(&self, cx: &CommandContext<'_>, options: &OptionMap) -> Result<(), CommandError> {
        let body = request_body(options)?;
        cx.api().update_release(&body).await?;
        output::print(
            format!("Success!, Updated release {}", body.hash),
            cx.ctx.verbosity,
        );
        Ok(())
    }
}
