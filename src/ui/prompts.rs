//! ui::prompts
//!
//! Interactive prompts.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode they
//! fail with [`PromptError::NotInteractive`] so callers can fall back.
//!
//! Masked input is read in raw mode with a short poll interval, so a prompt
//! can be abandoned through its [`CancellationToken`]. Raw mode is left on
//! every return path, including cancellation.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// How often a pending prompt checks for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed before a value was entered")]
    Closed,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("prompt cancelled")]
    Cancelled,

    #[error("prompt interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(err: io::Error) -> Self {
        PromptError::IoError(err.to_string())
    }
}

/// Prompt for masked input (e.g., tokens).
///
/// The input is not echoed to the terminal. The returned value is trimmed.
/// Returns [`PromptError::Cancelled`] once `cancel` fires.
pub fn password(
    message: &str,
    interactive: bool,
    cancel: &CancellationToken,
) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    if cancel.is_cancelled() {
        return Err(PromptError::Cancelled);
    }

    let mut stderr = io::stderr();
    write!(stderr, "{}", message)?;
    stderr.flush()?;

    let value = {
        let _raw = RawMode::enable()?;
        read_masked(cancel)
    };
    let _ = writeln!(stderr);
    value.map(|v| v.trim().to_string())
}

/// Raw mode for as long as the guard lives.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self, PromptError> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::debug!("failed to restore terminal mode: {}", e);
        }
    }
}

fn read_masked(cancel: &CancellationToken) -> Result<String, PromptError> {
    let mut value = String::new();
    loop {
        if cancel.is_cancelled() {
            return Err(PromptError::Cancelled);
        }
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if let Some(done) = apply_key(&mut value, key.code, key.modifiers) {
            return done.map(|()| value);
        }
    }
}

/// Apply one key press to the pending value.
///
/// Returns `Some` when the prompt is finished.
fn apply_key(
    value: &mut String,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Option<Result<(), PromptError>> {
    let control = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Enter => Some(Ok(())),
        KeyCode::Char('c') if control => Some(Err(PromptError::Interrupted)),
        KeyCode::Char('d') if control => Some(Err(PromptError::Closed)),
        KeyCode::Char('u') if control => {
            value.clear();
            None
        }
        KeyCode::Char(c) => {
            value.push(c);
            None
        }
        KeyCode::Backspace => {
            value.pop();
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_requires_interactive_mode() {
        let cancel = CancellationToken::new();
        assert!(matches!(
            password("Token: ", false, &cancel),
            Err(PromptError::NotInteractive)
        ));
    }

    #[test]
    fn cancelled_prompt_does_not_touch_the_terminal() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            password("Token: ", true, &cancel),
            Err(PromptError::Cancelled)
        ));
    }

    #[test]
    fn keys_edit_the_value() {
        let mut value = String::new();
        for c in "abcx".chars() {
            assert!(apply_key(&mut value, KeyCode::Char(c), KeyModifiers::NONE).is_none());
        }
        assert!(apply_key(&mut value, KeyCode::Backspace, KeyModifiers::NONE).is_none());
        assert_eq!(value, "abc");

        assert!(matches!(
            apply_key(&mut value, KeyCode::Enter, KeyModifiers::NONE),
            Some(Ok(()))
        ));
    }

    #[test]
    fn control_keys_end_or_reset_the_prompt() {
        let mut value = String::from("secret");
        assert!(apply_key(&mut value, KeyCode::Char('u'), KeyModifiers::CONTROL).is_none());
        assert!(value.is_empty());

        assert!(matches!(
            apply_key(&mut value, KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Err(PromptError::Interrupted))
        ));
        assert!(matches!(
            apply_key(&mut value, KeyCode::Char('d'), KeyModifiers::CONTROL),
            Some(Err(PromptError::Closed))
        ));
    }
}
