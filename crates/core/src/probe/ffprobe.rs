//! FFprobe-based prober implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ProbeError;
use super::traits::MediaProber;
use crate::config::ToolsConfig;
use crate::process::{limit_from_secs, run_tool, stderr_tail, ToolRunError};

/// Stream selector for video streams that are not attached pictures.
const VIDEO_SELECTOR: &str = "V:0";
/// Stream selector for the first audio stream.
const AUDIO_SELECTOR: &str = "a:0";

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProbeStream {
    codec_name: Option<String>,
}

/// FFprobe-based prober.
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
    timeout_secs: u64,
}

impl FfprobeProber {
    /// Creates a prober using the configured ffprobe binary.
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            ffprobe_path: config.ffprobe_path.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Creates a prober with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(&ToolsConfig::default())
    }

    fn map_run_error(&self, err: ToolRunError) -> ProbeError {
        match err {
            ToolRunError::NotFound => ProbeError::FfprobeNotFound {
                path: self.ffprobe_path.clone(),
            },
            ToolRunError::Timeout => ProbeError::Timeout {
                timeout_secs: self.timeout_secs,
            },
            ToolRunError::Io(e) => ProbeError::Io(e),
        }
    }

    /// Parses `-of json` output, returning the first selected stream.
    fn parse_output(output: &str) -> Result<Option<ProbeStream>, ProbeError> {
        let parsed: ProbeOutput =
            serde_json::from_str(output).map_err(|e| ProbeError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;
        Ok(parsed.streams.into_iter().next())
    }

    /// Queries the first stream matching `selector`.
    async fn query_stream(
        &self,
        path: &Path,
        selector: &str,
    ) -> Result<Option<ProbeStream>, ProbeError> {
        let args = [
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-select_streams"),
            OsStr::new(selector),
            OsStr::new("-show_entries"),
            OsStr::new("stream=codec_name"),
            OsStr::new("-of"),
            OsStr::new("json"),
            path.as_os_str(),
        ];
        let output = run_tool(&self.ffprobe_path, args, limit_from_secs(self.timeout_secs))
            .await
            .map_err(|e| self.map_run_error(e))?;

        if !output.status.success() {
            let reason = stderr_tail(&output.stderr, 3)
                .unwrap_or_else(|| format!("ffprobe exited with code: {:?}", output.status.code()));
            return Err(ProbeError::probe_failed(path, reason));
        }

        let stream = Self::parse_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            "Probed {:?} [{}]: {:?}",
            path,
            selector,
            stream.as_ref().and_then(|s| s.codec_name.as_deref())
        );
        Ok(stream)
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn validate(&self) -> Result<(), ProbeError> {
        run_tool(&self.ffprobe_path, ["-version"], limit_from_secs(self.timeout_secs))
            .await
            .map(|_| ())
            .map_err(|e| self.map_run_error(e))
    }

    async fn has_video_stream(&self, path: &Path) -> Result<bool, ProbeError> {
        Ok(self.query_stream(path, VIDEO_SELECTOR).await?.is_some())
    }

    async fn has_audio_stream(&self, path: &Path) -> Result<bool, ProbeError> {
        Ok(self.query_stream(path, AUDIO_SELECTOR).await?.is_some())
    }

    async fn video_codec(&self, path: &Path) -> Result<Option<String>, ProbeError> {
        Ok(self
            .query_stream(path, VIDEO_SELECTOR)
            .await?
            .and_then(|s| s.codec_name))
    }

    async fn audio_codec(&self, path: &Path) -> Result<Option<String>, ProbeError> {
        Ok(self
            .query_stream(path, AUDIO_SELECTOR)
            .await?
            .and_then(|s| s.codec_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_with_stream() {
        let json = r#"{
            "programs": [],
            "streams": [
                {
                    "codec_name": "theora",
                    "codec_type": "video"
                }
            ]
        }"#;
        let stream = FfprobeProber::parse_output(json).unwrap().unwrap();
        assert_eq!(stream.codec_name.as_deref(), Some("theora"));
    }

    #[test]
    fn test_parse_output_without_streams() {
        let json = r#"{ "programs": [], "streams": [] }"#;
        assert!(FfprobeProber::parse_output(json).unwrap().is_none());

        // Older ffprobe builds omit the key entirely.
        assert!(FfprobeProber::parse_output("{}").unwrap().is_none());
    }

    #[test]
    fn test_parse_output_stream_without_codec_name() {
        let json = r#"{ "streams": [ { "codec_type": "audio" } ] }"#;
        let stream = FfprobeProber::parse_output(json).unwrap().unwrap();
        assert!(stream.codec_name.is_none());
    }

    #[test]
    fn test_parse_output_garbage() {
        let result = FfprobeProber::parse_output("not json");
        assert!(matches!(result, Err(ProbeError::ParseError { .. })));
    }

    #[tokio::test]
    async fn test_validate_missing_ffprobe() {
        let config = ToolsConfig {
            ffprobe_path: PathBuf::from("/nonexistent/ffprobe"),
            ..Default::default()
        };
        let prober = FfprobeProber::new(&config);
        let result = prober.validate().await;
        assert!(matches!(result, Err(ProbeError::FfprobeNotFound { .. })));
    }
}
