//! bundle::process
//!
//! Child processes with streamed output.
//!
//! Stdout and stderr are read line by line concurrently. The call returns
//! only after both streams closed and the child exited, so nothing a child
//! prints can interleave with output of the next pipeline step.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::BundleError;
use crate::ui::output::{self, Verbosity};

/// Run `program` with `args` in `cwd`, forwarding stdout as info lines and
/// handing each stderr line to `on_stderr`.
///
/// The exit status is authoritative: stderr output alone never fails a step.
pub async fn run_streaming<I, S>(
    stage: &'static str,
    program: &Path,
    args: I,
    cwd: &Path,
    verbosity: Verbosity,
    mut on_stderr: impl FnMut(&str) + Send,
) -> Result<(), BundleError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    log::debug!("spawning {} ({})", stage, program.display());
    let mut child = command
        .spawn()
        .map_err(|source| BundleError::Spawn { stage, source })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_task = async {
        if let Some(stdout) = stdout {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if !line.is_empty() {
                    output::print(line, verbosity);
                }
            }
        }
    };

    let stderr_task = async {
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if !line.is_empty() {
                    on_stderr(line);
                }
            }
        }
    };

    tokio::join!(stdout_task, stderr_task);

    let status = child
        .wait()
        .await
        .map_err(|source| BundleError::Spawn { stage, source })?;

    check_status(stage, status)
}

fn check_status(stage: &'static str, status: ExitStatus) -> Result<(), BundleError> {
    if status.success() {
        return Ok(());
    }
    Err(BundleError::ProcessFailed {
        stage,
        code: status.code(),
        signal: signal_of(&status),
    })
}

#[cfg(unix)]
fn signal_of(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[tokio::test]
    async fn zero_exit_succeeds_despite_stderr() {
        let dir = TempDir::new().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        run_streaming(
            "probe",
            Path::new("/bin/sh"),
            ["-c", "echo out; echo warn 1>&2; echo again 1>&2"],
            dir.path(),
            Verbosity::Quiet,
            move |line| sink.lock().unwrap().push(line.to_string()),
        )
        .await
        .expect("success");

        assert_eq!(*seen.lock().unwrap(), vec!["warn", "again"]);
    }

    #[tokio::test]
    async fn nonzero_exit_carries_code() {
        let dir = TempDir::new().unwrap();
        let err = run_streaming(
            "probe",
            Path::new("/bin/sh"),
            ["-c", "exit 3"],
            dir.path(),
            Verbosity::Quiet,
            |_| {},
        )
        .await
        .unwrap_err();

        match err {
            BundleError::ProcessFailed { stage, code, signal } => {
                assert_eq!(stage, "probe");
                assert_eq!(code, Some(3));
                assert_eq!(signal, None);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn signal_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = run_streaming(
            "probe",
            Path::new("/bin/sh"),
            ["-c", "kill -9 $$"],
            dir.path(),
            Verbosity::Quiet,
            |_| {},
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            BundleError::ProcessFailed {
                code: None,
                signal: Some(9),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let err = run_streaming(
            "probe",
            Path::new("/definitely/not/here"),
            Vec::<String>::new(),
            dir.path(),
            Verbosity::Quiet,
            |_| {},
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BundleError::Spawn { stage: "probe", .. }));
    }
}
