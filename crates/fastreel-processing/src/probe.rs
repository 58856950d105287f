//! Aspect classification through ffprobe.

use crate::command::run_tool;
use crate::error::{ProcessingError, ProcessingResult};
use async_trait::async_trait;
use fastreel_core::AspectClass;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// ffprobe `-show_streams` JSON output, reduced to what classification reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Source of stream geometry for a local media file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path, cancel: &CancellationToken) -> ProcessingResult<ProbeReport>;
}

/// Classify the first reported stream.
///
/// No streams, missing geometry, or a zero height all mean there is nothing to classify.
pub fn classify_report(report: &ProbeReport) -> ProcessingResult<AspectClass> {
    let stream = report.streams.first().ok_or_else(|| {
        ProcessingError::MetadataUnavailable("probe reported no streams".to_string())
    })?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) => AspectClass::from_dimensions(width, height).ok_or_else(|| {
            ProcessingError::MetadataUnavailable(format!(
                "first stream has zero height ({}x{})",
                width, height
            ))
        }),
        _ => Err(ProcessingError::MetadataUnavailable(
            "first stream has no width/height".to_string(),
        )),
    }
}

/// [`MediaProbe`] backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.ffprobe_path);
        command
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path);
        command
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    #[tracing::instrument(skip(self, path, cancel), fields(path = %path.display()))]
    async fn probe(&self, path: &Path, cancel: &CancellationToken) -> ProcessingResult<ProbeReport> {
        let output = run_tool("ffprobe", self.command(path), self.timeout, cancel).await?;

        serde_json::from_slice(&output.stdout).map_err(|e| ProcessingError::ToolFailed {
            tool: "ffprobe",
            message: format!("unparseable output: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(json: &str) -> ProbeReport {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn classifies_first_stream_only() {
        let report = report(
            r#"{"streams":[
                {"index":0,"codec_type":"video","width":1920,"height":1080},
                {"index":1,"codec_type":"video","width":1080,"height":1920}
            ]}"#,
        );
        assert_eq!(classify_report(&report).unwrap(), AspectClass::Landscape);
    }

    #[test]
    fn portrait_and_square() {
        let portrait = report(r#"{"streams":[{"width":1080,"height":1920}]}"#);
        assert_eq!(classify_report(&portrait).unwrap(), AspectClass::Portrait);

        let square = report(r#"{"streams":[{"width":1000,"height":1000}]}"#);
        assert_eq!(classify_report(&square).unwrap(), AspectClass::Other);
    }

    #[test]
    fn zero_streams_is_metadata_unavailable() {
        for json in [r#"{"streams":[]}"#, r#"{}"#] {
            assert!(matches!(
                classify_report(&report(json)),
                Err(ProcessingError::MetadataUnavailable(_))
            ));
        }
    }

    #[test]
    fn zero_height_or_missing_geometry_is_metadata_unavailable() {
        for json in [
            r#"{"streams":[{"width":1920,"height":0}]}"#,
            r#"{"streams":[{"codec_type":"audio"}]}"#,
            r#"{"streams":[{"width":1920}]}"#,
        ] {
            assert!(matches!(
                classify_report(&report(json)),
                Err(ProcessingError::MetadataUnavailable(_))
            ));
        }
    }

    #[test]
    fn ffprobe_arguments() {
        let probe = FfprobeProbe::new("ffprobe", Duration::from_secs(30));
        let command = probe.command(Path::new("/tmp/upload.mp4"));
        let args: Vec<_> = command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
                "/tmp/upload.mp4"
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unparseable_output_is_a_tool_failure() {
        // echo prints its arguments, which is not JSON.
        let probe = FfprobeProbe::new("echo", Duration::from_secs(5));
        let result = probe
            .probe(Path::new("/tmp/upload.mp4"), &CancellationToken::new())
            .await;
        assert!(matches!(
            result,
            Err(ProcessingError::ToolFailed { tool: "ffprobe", .. })
        ));
    }
}
