//! Media kinds, extension tables and the canonical-format rules.
//!
//! Every kind converges on exactly one output format:
//!
//! - images: PNG (`.png`)
//! - audio: Vorbis in an Ogg container (`.ogg`)
//! - video: Theora + Vorbis in an Ogg container (`.ogv`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Canonical raster extension.
pub const CANONICAL_IMAGE_EXT: &str = "png";
/// Canonical audio container extension.
pub const CANONICAL_AUDIO_EXT: &str = "ogg";
/// Canonical video container extension.
pub const CANONICAL_VIDEO_EXT: &str = "ogv";
/// Required audio codec (ffprobe name), for audio files and video soundtracks.
pub const CANONICAL_AUDIO_CODEC: &str = "vorbis";
/// Required video codec (ffprobe name).
pub const CANONICAL_VIDEO_CODEC: &str = "theora";

/// Vector format that is recognised but never rasterized.
pub const VECTOR_IMAGE_EXT: &str = "svg";

/// Raster extensions considered for conversion (including the canonical one).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "jfif", "gif", "bmp", "tif", "tiff", "webp", "ico", "avif", "heic",
    "heif",
];

/// Audio and video container extensions. Which one a file really is gets
/// decided by probing.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    // Audio
    "mp3", "wav", "flac", "m4a", "aac", "oga", "ogg", "opus", "wma", "aif", "aiff",
    // Video
    "mp4", "m4v", "mov", "avi", "mkv", "webm", "ogv", "wmv", "flv", "mpg", "mpeg", "3gp",
];

/// Documents whose text may reference media files.
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Inferred kind of a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Unclassified,
}

impl MediaKind {
    /// Extension every file of this kind converges on.
    pub fn canonical_extension(&self) -> Option<&'static str> {
        match self {
            Self::Image => Some(CANONICAL_IMAGE_EXT),
            Self::Audio => Some(CANONICAL_AUDIO_EXT),
            Self::Video => Some(CANONICAL_VIDEO_EXT),
            Self::Unclassified => None,
        }
    }

    /// Name of the tool category used in pre-flight errors.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

/// Lowercased extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Stream facts gathered from the prober.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub has_video: bool,
    pub has_audio: bool,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
}

impl StreamInfo {
    fn audio_codec_is(&self, codec: &str) -> bool {
        self.audio_codec
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(codec))
    }

    fn video_codec_is(&self, codec: &str) -> bool {
        self.video_codec
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(codec))
    }
}

/// Images are canonical purely by extension.
pub fn image_is_canonical(extension: &str) -> bool {
    extension == CANONICAL_IMAGE_EXT
}

/// Canonical container, canonical codec, and no video stream hiding inside.
pub fn audio_is_canonical(extension: &str, streams: &StreamInfo) -> bool {
    extension == CANONICAL_AUDIO_EXT
        && streams.has_audio
        && streams.audio_codec_is(CANONICAL_AUDIO_CODEC)
        && !streams.has_video
}

/// Canonical container and video codec; a soundtrack, if any, must be canonical too.
pub fn video_is_canonical(extension: &str, streams: &StreamInfo) -> bool {
    extension == CANONICAL_VIDEO_EXT
        && streams.has_video
        && streams.video_codec_is(CANONICAL_VIDEO_CODEC)
        && (!streams.has_audio || streams.audio_codec_is(CANONICAL_AUDIO_CODEC))
}

/// Path a file of `kind` must become.
///
/// Images always swap the extension. Audio and video keep their path when the
/// container already matches (in-place re-encode).
pub fn conversion_target(source: &Path, kind: MediaKind) -> Option<PathBuf> {
    let canonical = kind.canonical_extension()?;
    if kind != MediaKind::Image && extension_of(source) == canonical {
        return Some(source.to_path_buf());
    }
    Some(source.with_extension(canonical))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streams(video: Option<&str>, audio: Option<&str>) -> StreamInfo {
        StreamInfo {
            has_video: video.is_some(),
            has_audio: audio.is_some(),
            video_codec: video.map(String::from),
            audio_codec: audio.map(String::from),
        }
    }

    #[test]
    fn test_image_target_always_swaps_extension() {
        assert_eq!(
            conversion_target(Path::new("/site/img/logo.JPG"), MediaKind::Image),
            Some(PathBuf::from("/site/img/logo.png"))
        );
    }

    #[test]
    fn test_audio_target_in_place_when_container_matches() {
        let source = Path::new("/site/a/song.ogg");
        assert_eq!(
            conversion_target(source, MediaKind::Audio),
            Some(source.to_path_buf())
        );
        assert_eq!(
            conversion_target(Path::new("/site/a/song.mp3"), MediaKind::Audio),
            Some(PathBuf::from("/site/a/song.ogg"))
        );
    }

    #[test]
    fn test_video_in_audio_container_gets_video_extension() {
        assert_eq!(
            conversion_target(Path::new("/site/clip.ogg"), MediaKind::Video),
            Some(PathBuf::from("/site/clip.ogv"))
        );
    }

    #[test]
    fn test_unclassified_has_no_target() {
        assert_eq!(
            conversion_target(Path::new("/x.mp4"), MediaKind::Unclassified),
            None
        );
    }

    #[test]
    fn test_audio_canonicality() {
        assert!(audio_is_canonical("ogg", &streams(None, Some("vorbis"))));
        assert!(!audio_is_canonical("ogg", &streams(None, Some("opus"))));
        assert!(!audio_is_canonical("oga", &streams(None, Some("vorbis"))));
        // Mislabeled video in an audio container.
        assert!(!audio_is_canonical(
            "ogg",
            &streams(Some("theora"), Some("vorbis"))
        ));
    }

    #[test]
    fn test_video_canonicality() {
        assert!(video_is_canonical("ogv", &streams(Some("theora"), None)));
        assert!(video_is_canonical(
            "ogv",
            &streams(Some("theora"), Some("vorbis"))
        ));
        assert!(!video_is_canonical(
            "ogv",
            &streams(Some("theora"), Some("opus"))
        ));
        assert!(!video_is_canonical("ogv", &streams(Some("vp8"), None)));
        assert!(!video_is_canonical("webm", &streams(Some("theora"), None)));
    }

    #[test]
    fn test_image_canonicality() {
        assert!(image_is_canonical("png"));
        assert!(!image_is_canonical("jpg"));
    }

    #[test]
    fn test_extension_of_lowercases() {
        assert_eq!(extension_of(Path::new("A/B.JpEg")), "jpeg");
        assert_eq!(extension_of(Path::new("README")), "");
    }
}
