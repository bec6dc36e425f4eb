//! Mock prober for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::probe::{MediaProber, ProbeError};

/// Scripted probe answer for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeScript {
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    /// When set, every probe of the file fails with this reason.
    pub failure: Option<String>,
}

impl ProbeScript {
    /// A file with a video stream and an optional soundtrack.
    pub fn video(codec: &str, audio: Option<&str>) -> Self {
        Self {
            video_codec: Some(codec.to_string()),
            audio_codec: audio.map(String::from),
            failure: None,
        }
    }

    /// An audio-only file.
    pub fn audio(codec: &str) -> Self {
        Self {
            video_codec: None,
            audio_codec: Some(codec.to_string()),
            failure: None,
        }
    }

    /// A readable file without audio or video streams.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A file the prober rejects.
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Default::default()
        }
    }

    /// Parses fixture content such as `video=theora audio=vorbis`.
    ///
    /// Recognised tokens are `video=<codec>`, `audio=<codec>` and
    /// `fail=<reason>`; anything else is ignored.
    pub fn parse(content: &str) -> Self {
        let mut script = Self::default();
        for token in content.split_whitespace() {
            if let Some(codec) = token.strip_prefix("video=") {
                script.video_codec = Some(codec.to_string());
            } else if let Some(codec) = token.strip_prefix("audio=") {
                script.audio_codec = Some(codec.to_string());
            } else if let Some(reason) = token.strip_prefix("fail=") {
                script.failure = Some(reason.to_string());
            }
        }
        script
    }

    /// Fixture content that [`ProbeScript::parse`] reads back as `self`.
    pub fn to_content(&self) -> String {
        let mut tokens = Vec::new();
        if let Some(codec) = &self.video_codec {
            tokens.push(format!("video={}", codec));
        }
        if let Some(codec) = &self.audio_codec {
            tokens.push(format!("audio={}", codec));
        }
        if let Some(reason) = &self.failure {
            tokens.push(format!("fail={}", reason));
        }
        tokens.join(" ")
    }
}

/// Mock implementation of the MediaProber trait.
///
/// Answers come from scripts registered per path; unregistered files are
/// read from disk and parsed with [`ProbeScript::parse`], so fixtures and
/// [`super::MockConverter`] outputs describe their own streams.
///
/// # Example
///
/// ```rust,ignore
/// use mediacanon_core::testing::{MockProber, ProbeScript};
///
/// let prober = MockProber::new();
/// prober.set("/site/clip.mp4", ProbeScript::video("h264", Some("aac"))).await;
///
/// assert!(prober.has_video_stream(Path::new("/site/clip.mp4")).await?);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockProber {
    scripts: Arc<RwLock<HashMap<PathBuf, ProbeScript>>>,
    probe_count: Arc<RwLock<usize>>,
    missing: Arc<RwLock<bool>>,
}

impl MockProber {
    /// Create a new mock prober.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the answer for a specific path.
    pub async fn set(&self, path: impl AsRef<Path>, script: ProbeScript) {
        self.scripts
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), script);
    }

    /// Make `validate` report the tool as missing.
    pub async fn set_missing(&self, missing: bool) {
        *self.missing.write().await = missing;
    }

    /// Number of stream queries answered so far.
    pub async fn probe_count(&self) -> usize {
        *self.probe_count.read().await
    }

    async fn script_for(&self, path: &Path) -> Result<ProbeScript, ProbeError> {
        *self.probe_count.write().await += 1;

        let script = match self.scripts.read().await.get(path) {
            Some(script) => script.clone(),
            None => {
                let content = tokio::fs::read(path)
                    .await
                    .map_err(|e| ProbeError::probe_failed(path, e.to_string()))?;
                ProbeScript::parse(&String::from_utf8_lossy(&content))
            }
        };

        match &script.failure {
            Some(reason) => Err(ProbeError::probe_failed(path, reason.clone())),
            None => Ok(script),
        }
    }
}

#[async_trait]
impl MediaProber for MockProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), ProbeError> {
        if *self.missing.read().await {
            return Err(ProbeError::FfprobeNotFound {
                path: PathBuf::from("mock-ffprobe"),
            });
        }
        Ok(())
    }

    async fn has_video_stream(&self, path: &Path) -> Result<bool, ProbeError> {
        Ok(self.script_for(path).await?.video_codec.is_some())
    }

    async fn has_audio_stream(&self, path: &Path) -> Result<bool, ProbeError> {
        Ok(self.script_for(path).await?.audio_codec.is_some())
    }

    async fn video_codec(&self, path: &Path) -> Result<Option<String>, ProbeError> {
        Ok(self.script_for(path).await?.video_codec)
    }

    async fn audio_codec(&self, path: &Path) -> Result<Option<String>, ProbeError> {
        Ok(self.script_for(path).await?.audio_codec)
    }
}
