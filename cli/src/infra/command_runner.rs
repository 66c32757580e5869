//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::application::ports::CommandRunner;
use crate::domain::{Capture, CommandError, CommandResult, CommandSpec};

/// Production `CommandRunner` — each command is bounded by `timeout`; on
/// expiry the child is killed rather than left running.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

async fn drain<H: AsyncRead + Unpin>(handle: Option<H>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = h.read_to_end(&mut buf).await;
    }
    buf
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

impl CommandRunner for TokioCommandRunner {
    async fn execute(
        &self,
        command: &CommandSpec,
        capture: Capture,
    ) -> Result<CommandResult, CommandError> {
        let rendered = command.to_string();

        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k, v)))
            .kill_on_drop(true);
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(if command.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        match capture {
            Capture::Buffered => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            Capture::Streamed => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        tracing::debug!(command = %rendered, ?capture, "spawning");
        let mut child = cmd.spawn().map_err(|e| CommandError::Launch {
            command: rendered.clone(),
            reason: e.to_string(),
        })?;

        // Write stdin in a spawned task to avoid deadlock with stdout/stderr reads.
        let stdin_handle = child.stdin.take();
        let input = command.stdin.clone();
        let stdin_task = tokio::spawn(async move {
            if let (Some(mut stdin), Some(input)) = (stdin_handle, input) {
                use tokio::io::AsyncWriteExt;
                let _ = stdin.write_all(&input).await;
            }
        });

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();

        // Read stdout/stderr CONCURRENTLY with wait() to avoid pipe deadlock.
        // A child that fills the OS pipe buffer blocks on write, and wait()
        // alone would never resolve.
        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    drain(stdout_handle),
                    drain(stderr_handle),
                );
                let _ = stdin_task.await;
                let status = status.map_err(|e| CommandError::Launch {
                    command: rendered.clone(),
                    reason: format!("waiting for process: {e}"),
                })?;
                let result = CommandResult {
                    exit_code: exit_code(status),
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                };
                tracing::debug!(command = %rendered, exit_code = result.exit_code, "finished");
                if status.success() {
                    Ok(result)
                } else {
                    Err(CommandError::Failed {
                        command: rendered.clone(),
                        exit_code: result.exit_code,
                        result,
                    })
                }
            } => result,
            () = tokio::time::sleep(self.timeout) => {
                let _ = child.kill().await;
                tracing::error!(command = %rendered, secs = self.timeout.as_secs(), "timed out");
                Err(CommandError::TimedOut {
                    command: rendered.clone(),
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}
