use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Tool paths are not empty
/// - Encoder quality values are within the encoders' ranges
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let tools = [
        ("tools.ffmpeg_path", &config.tools.ffmpeg_path),
        ("tools.ffprobe_path", &config.tools.ffprobe_path),
        ("tools.magick_path", &config.tools.magick_path),
    ];
    for (key, path) in tools {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                key
            )));
        }
    }

    if !(-1..=10).contains(&config.encoding.audio_quality) {
        return Err(ConfigError::ValidationError(
            "encoding.audio_quality must be between -1 and 10".to_string(),
        ));
    }

    if config.encoding.video_quality > 10 {
        return Err(ConfigError::ValidationError(
            "encoding.video_quality must be between 0 and 10".to_string(),
        ));
    }

    Ok(())
}
