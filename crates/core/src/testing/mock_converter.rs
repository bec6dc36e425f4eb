//! Mock converter for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::ProbeScript;
use crate::converter::{ConversionJob, ConversionSpec, Converter, ConverterError};
use crate::formats::{CANONICAL_AUDIO_CODEC, CANONICAL_VIDEO_CODEC};

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion jobs for assertions
/// - Fail conversions of chosen sources
/// - Report the tool as missing
///
/// Successful jobs write deterministic output: audio and video outputs hold
/// fixture content that [`super::MockProber`] reads back as canonical streams,
/// image outputs hold `PNG:` followed by the source bytes.
#[derive(Debug, Clone, Default)]
pub struct MockConverter {
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    failing_sources: Arc<RwLock<HashSet<PathBuf>>>,
    missing: Arc<RwLock<bool>>,
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Make conversions of `source` fail like a crashing tool.
    pub async fn fail_for(&self, source: impl AsRef<Path>) {
        self.failing_sources
            .write()
            .await
            .insert(source.as_ref().to_path_buf());
    }

    /// Make `validate` report the tool as missing.
    pub async fn set_missing(&self, missing: bool) {
        *self.missing.write().await = missing;
    }

    async fn render(job: &ConversionJob) -> Result<Vec<u8>, ConverterError> {
        let bytes = match &job.spec {
            ConversionSpec::Image => {
                let mut out = b"PNG:".to_vec();
                out.extend(tokio::fs::read(&job.source).await?);
                out
            }
            ConversionSpec::Audio { .. } => ProbeScript::audio(CANONICAL_AUDIO_CODEC)
                .to_content()
                .into_bytes(),
            ConversionSpec::Video { with_audio, .. } => ProbeScript::video(
                CANONICAL_VIDEO_CODEC,
                with_audio.then_some(CANONICAL_AUDIO_CODEC),
            )
            .to_content()
            .into_bytes(),
        };
        Ok(bytes)
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        if *self.missing.read().await {
            return Err(ConverterError::ToolNotFound {
                tool: "mock".to_string(),
                path: PathBuf::from("mock-tool"),
            });
        }
        Ok(())
    }

    async fn convert(&self, job: &ConversionJob) -> Result<(), ConverterError> {
        if self.failing_sources.read().await.contains(&job.source) {
            self.conversions.write().await.push(RecordedConversion {
                job: job.clone(),
                success: false,
            });
            return Err(ConverterError::conversion_failed(
                "mock exited with code: Some(1)",
                Some("simulated failure".to_string()),
            ));
        }

        let bytes = Self::render(job).await?;
        tokio::fs::write(&job.output, bytes).await?;

        self.conversions.write().await.push(RecordedConversion {
            job: job.clone(),
            success: true,
        });
        Ok(())
    }
}
