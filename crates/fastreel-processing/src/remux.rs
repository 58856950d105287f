//! Fast-start remux through ffmpeg: stream copy into a new MP4 with the index atoms
//! moved to the front.

use crate::command::run_tool;
use crate::error::{ProcessingError, ProcessingResult};
use async_trait::async_trait;
use fastreel_core::constants::REMUX_OUTPUT_SUFFIX;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempPath;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Produce a playback-optimized copy of `input`. The returned path is removed on drop.
    async fn remux(&self, input: &Path, cancel: &CancellationToken) -> ProcessingResult<TempPath>;
}

/// `<input>.processing`, next to the input.
pub fn remux_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(REMUX_OUTPUT_SUFFIX);
    PathBuf::from(name)
}

#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(["-y", "-v", "error", "-i"])
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(output);
        command
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self, input, cancel), fields(input = %input.display()))]
    async fn remux(&self, input: &Path, cancel: &CancellationToken) -> ProcessingResult<TempPath> {
        // Owned from the start so a partial file is removed on any failure below.
        let output = TempPath::from_path(remux_output_path(input));

        run_tool("ffmpeg", self.command(input, &output), self.timeout, cancel)
            .await
            .map_err(|e| match e {
                ProcessingError::ToolFailed { message, .. } => ProcessingError::RemuxFailed(message),
                other => other,
            })?;

        let size = match tokio::fs::metadata(&output).await {
            Ok(meta) => meta.len(),
            Err(_) => {
                return Err(ProcessingError::RemuxFailed(
                    "ffmpeg produced no output file".to_string(),
                ))
            }
        };
        if size == 0 {
            return Err(ProcessingError::RemuxFailed(
                "ffmpeg produced an empty output file".to_string(),
            ));
        }

        tracing::info!(output = %output.display(), size_bytes = size, "Remux complete");
        Ok(output)
    }
}
