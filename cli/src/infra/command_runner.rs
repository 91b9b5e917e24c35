//! Infrastructure implementation of the `CommandRunner` port.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::application::ports::CommandRunner;

/// Default timeout for provider CLI calls (describe, start, stop).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for network-manager calls; activation can be slow.
pub const DEFAULT_NM_TIMEOUT: Duration = Duration::from_secs(90);

/// Runs the local helper binaries (`aws`, `nmcli`) with a deadline.
///
/// The child never sees the terminal's stdin: the REPL owns it. A child
/// that outlives its deadline is killed before the error is returned.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Read a captured pipe to the end. Read errors leave a partial buffer.
async fn drain(pipe: Option<impl AsyncRead + Unpin>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "pipe read failed");
        }
    }
    buf
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, ?args, timeout_secs = timeout.as_secs(), "spawning helper");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let finished = tokio::time::timeout(timeout, async {
            tokio::join!(child.wait(), drain(stdout), drain(stderr))
        })
        .await;

        let Ok((status, stdout, stderr)) = finished else {
            if let Err(e) = child.kill().await {
                tracing::warn!(program, error = %e, "failed to kill timed-out helper");
            }
            anyhow::bail!("{program} timed out after {}s", timeout.as_secs());
        };
        let status = status.with_context(|| format!("waiting for {program}"))?;
        tracing::debug!(program, code = ?status.code(), "helper exited");
        Ok(Output {
            status,
            stdout,
            stderr,
        })
    }
}
