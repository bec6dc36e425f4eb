//! Trait definitions for the probe module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ProbeError;

/// Inspects the streams of a media file.
///
/// Cover art and other attached pictures never count as a video stream.
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Returns the name of this prober implementation.
    fn name(&self) -> &str;

    /// Validates that the backing tool is available.
    async fn validate(&self) -> Result<(), ProbeError>;

    /// Whether the file carries a real video stream.
    async fn has_video_stream(&self, path: &Path) -> Result<bool, ProbeError>;

    /// Whether the file carries an audio stream.
    async fn has_audio_stream(&self, path: &Path) -> Result<bool, ProbeError>;

    /// Codec name of the first video stream, if any.
    async fn video_codec(&self, path: &Path) -> Result<Option<String>, ProbeError>;

    /// Codec name of the first audio stream, if any.
    async fn audio_codec(&self, path: &Path) -> Result<Option<String>, ProbeError>;
}
