//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What a conversion job must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversionSpec {
    /// First frame rasterized to PNG.
    Image,
    /// Vorbis in Ogg at a fixed VBR quality.
    Audio { quality: i8 },
    /// Theora in Ogg, plus a Vorbis soundtrack when the source has audio.
    Video {
        video_quality: u8,
        audio_quality: i8,
        with_audio: bool,
    },
}

impl fmt::Display for ConversionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Audio { .. } => f.write_str("audio"),
            Self::Video { .. } => f.write_str("video"),
        }
    }
}

/// A single conversion: read `source`, write `output`.
///
/// `output` is a staging file next to the final target, never the target itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionJob {
    pub source: PathBuf,
    pub output: PathBuf,
    pub spec: ConversionSpec,
}
