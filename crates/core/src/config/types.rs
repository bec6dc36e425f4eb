use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

/// External tool locations and limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Transcoder binary
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Stream prober binary
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    /// Raster converter binary (ImageMagick 7)
    #[serde(default = "default_magick_path")]
    pub magick_path: PathBuf,
    /// Upper bound for a single tool invocation, 0 disables the limit
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            magick_path: default_magick_path(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_magick_path() -> PathBuf {
    PathBuf::from("magick")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

/// Fixed quality targets for the lossy encoders
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncodingConfig {
    /// Vorbis VBR quality (-1..=10)
    #[serde(default = "default_audio_quality")]
    pub audio_quality: i8,
    /// Theora quality (0..=10)
    #[serde(default = "default_video_quality")]
    pub video_quality: u8,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            audio_quality: default_audio_quality(),
            video_quality: default_video_quality(),
        }
    }
}

fn default_audio_quality() -> i8 {
    5
}

fn default_video_quality() -> u8 {
    7
}

/// Scanner tweaks
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Directory names pruned in addition to the built-in skip-list
    #[serde(default)]
    pub extra_skip_dirs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tools.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.tools.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.tools.magick_path, PathBuf::from("magick"));
        assert_eq!(config.tools.timeout_secs, 3600);
        assert_eq!(config.encoding.audio_quality, 5);
        assert_eq!(config.encoding.video_quality, 7);
        assert!(config.scan.extra_skip_dirs.is_empty());
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let toml = r#"
[tools]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 0

[scan]
extra_skip_dirs = ["drafts"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.tools.ffmpeg_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        assert_eq!(config.tools.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.tools.timeout_secs, 0);
        assert_eq!(config.scan.extra_skip_dirs, vec!["drafts".to_string()]);
    }

    #[test]
    fn test_deserialize_unknown_field_type_fails() {
        let toml = r#"
[encoding]
audio_quality = "high"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}
