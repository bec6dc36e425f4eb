//! Content-based classification of audio/video candidates.
//!
//! Extensions lie: an `.ogg` may hold Theora video, an `.mp4` may be audio
//! only. The classifier asks the prober what streams a file carries and
//! decides from that alone.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::formats::{extension_of, MediaKind, StreamInfo};
use crate::probe::{MediaProber, ProbeError};

/// A scanned file with its inferred kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Lowercased extension.
    pub extension: String,
    pub kind: MediaKind,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self {
            path,
            extension,
            kind,
        }
    }

    /// Image candidates are classified by extension alone.
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self::new(path, MediaKind::Image)
    }
}

/// Outcome of classifying one media candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub file: MediaFile,
    /// Stream presence as probed; codec names are filled in by the planner.
    pub streams: StreamInfo,
}

impl Classified {
    pub fn is_unclassifiable(&self) -> bool {
        self.file.kind == MediaKind::Unclassified
    }
}

/// Classifies a media candidate: video wins over audio, neither means unclassified.
pub async fn classify(prober: &dyn MediaProber, path: &Path) -> Result<Classified, ProbeError> {
    let has_video = prober.has_video_stream(path).await?;
    // A video stream decides the kind regardless of audio, but the audio flag
    // still matters for conversion and canonicality.
    let has_audio = prober.has_audio_stream(path).await?;

    let kind = if has_video {
        MediaKind::Video
    } else if has_audio {
        MediaKind::Audio
    } else {
        MediaKind::Unclassified
    };
    debug!("Classified {:?} as {}", path, kind);

    Ok(Classified {
        file: MediaFile::new(path, kind),
        streams: StreamInfo {
            has_video,
            has_audio,
            video_codec: None,
            audio_codec: None,
        },
    })
}
