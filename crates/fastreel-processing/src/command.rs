//! External tool runner with timeout and cancellation.

use crate::error::{ProcessingError, ProcessingResult};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

const STDERR_TAIL_BYTES: usize = 2048;

/// Captured output of a successful tool run.
#[derive(Debug)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Run `command` to completion.
///
/// The child is killed if `timeout` elapses or `cancel` fires first. A nonzero exit status
/// is a [`ProcessingError::ToolFailed`] carrying the tail of stderr.
pub async fn run_tool(
    tool: &'static str,
    mut command: Command,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ProcessingResult<ToolOutput> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProcessingError::ToolFailed {
            tool,
            message: format!("failed to start: {}", e),
        })?;

    let start = std::time::Instant::now();

    let output = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!(tool = tool, "Request cancelled, killing external process");
            return Err(ProcessingError::Cancelled);
        }
        result = tokio::time::timeout(timeout, child.wait_with_output()) => match result {
            Ok(output) => output.map_err(|e| ProcessingError::ToolFailed {
                tool,
                message: e.to_string(),
            })?,
            Err(_) => {
                tracing::warn!(
                    tool = tool,
                    timeout_secs = timeout.as_secs_f64(),
                    "External process timed out, killing it"
                );
                return Err(ProcessingError::ToolTimeout { tool, timeout });
            }
        },
    };

    let stderr = stderr_tail(&output.stderr);
    tracing::debug!(
        tool = tool,
        status = %output.status,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "External process finished"
    );

    if !output.status.success() {
        return Err(ProcessingError::ToolFailed {
            tool,
            message: format!("exited with {}: {}", output.status, stderr),
        });
    }

    Ok(ToolOutput {
        stdout: output.stdout,
        stderr,
    })
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}
