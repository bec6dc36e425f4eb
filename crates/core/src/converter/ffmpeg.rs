//! FFmpeg-based audio and video converter.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionSpec};
use crate::config::ToolsConfig;
use crate::process::{limit_from_secs, run_tool, stderr_tail, ToolRunError};

/// Vorbis encoder name in ffmpeg.
const AUDIO_ENCODER: &str = "libvorbis";
/// Theora encoder name in ffmpeg.
const VIDEO_ENCODER: &str = "libtheora";
/// Output muxer for both audio and video.
const OUTPUT_FORMAT: &str = "ogg";

/// FFmpeg-based converter for audio and video jobs.
pub struct FfmpegConverter {
    ffmpeg_path: PathBuf,
    timeout_secs: u64,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given tool configuration.
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(&ToolsConfig::default())
    }

    fn map_run_error(&self, err: ToolRunError) -> ConverterError {
        match err {
            ToolRunError::NotFound => ConverterError::ToolNotFound {
                tool: "ffmpeg".to_string(),
                path: self.ffmpeg_path.clone(),
            },
            ToolRunError::Timeout => ConverterError::Timeout {
                timeout_secs: self.timeout_secs,
            },
            ToolRunError::Io(e) => ConverterError::Io(e),
        }
    }

    fn input_args(input_path: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(), // Overwrite the staging file
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
        ]
    }

    fn output_args(args: &mut Vec<String>, output_path: &Path) {
        // Subtitle and data streams have no place in an Ogg output
        args.extend(["-sn".to_string(), "-dn".to_string()]);
        args.extend(["-f".to_string(), OUTPUT_FORMAT.to_string()]);
        args.push(output_path.to_string_lossy().to_string());
    }

    /// Builds ffmpeg arguments for audio conversion.
    fn build_audio_args(input_path: &Path, output_path: &Path, quality: i8) -> Vec<String> {
        let mut args = Self::input_args(input_path);

        args.extend([
            "-map".to_string(),
            "0:a:0".to_string(),
            "-vn".to_string(),
            "-c:a".to_string(),
            AUDIO_ENCODER.to_string(),
            "-q:a".to_string(),
            quality.to_string(),
        ]);

        Self::output_args(&mut args, output_path);
        args
    }

    /// Builds ffmpeg arguments for video conversion.
    fn build_video_args(
        input_path: &Path,
        output_path: &Path,
        video_quality: u8,
        audio_quality: i8,
        with_audio: bool,
    ) -> Vec<String> {
        let mut args = Self::input_args(input_path);

        // Video codec
        args.extend([
            "-map".to_string(),
            "0:V:0".to_string(),
            "-c:v".to_string(),
            VIDEO_ENCODER.to_string(),
            "-q:v".to_string(),
            video_quality.to_string(),
        ]);

        // Audio settings
        if with_audio {
            args.extend([
                "-map".to_string(),
                "0:a:0".to_string(),
                "-c:a".to_string(),
                AUDIO_ENCODER.to_string(),
                "-q:a".to_string(),
                audio_quality.to_string(),
            ]);
        } else {
            args.push("-an".to_string());
        }

        Self::output_args(&mut args, output_path);
        args
    }

    fn build_args(&self, job: &ConversionJob) -> Result<Vec<String>, ConverterError> {
        match &job.spec {
            ConversionSpec::Audio { quality } => {
                Ok(Self::build_audio_args(&job.source, &job.output, *quality))
            }
            ConversionSpec::Video {
                video_quality,
                audio_quality,
                with_audio,
            } => Ok(Self::build_video_args(
                &job.source,
                &job.output,
                *video_quality,
                *audio_quality,
                *with_audio,
            )),
            other => Err(ConverterError::UnsupportedSpec {
                converter: self.name().to_string(),
                spec: other.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        run_tool(&self.ffmpeg_path, ["-version"], limit_from_secs(self.timeout_secs))
            .await
            .map(|_| ())
            .map_err(|e| self.map_run_error(e))
    }

    async fn convert(&self, job: &ConversionJob) -> Result<(), ConverterError> {
        let start = Instant::now();
        let args = self.build_args(job)?;

        let output = run_tool(&self.ffmpeg_path, &args, limit_from_secs(self.timeout_secs))
            .await
            .map_err(|e| self.map_run_error(e))?;

        if !output.status.success() {
            return Err(ConverterError::conversion_failed(
                format!("ffmpeg exited with code: {:?}", output.status.code()),
                stderr_tail(&output.stderr, 5),
            ));
        }

        // Verify output exists
        let meta = tokio::fs::metadata(&job.output)
            .await
            .map_err(|_| ConverterError::conversion_failed("Output file not created", None))?;
        if meta.len() == 0 {
            return Err(ConverterError::conversion_failed(
                "Output file is empty",
                stderr_tail(&output.stderr, 5),
            ));
        }

        debug!(
            "ffmpeg {} job for {:?} finished in {} ms",
            job.spec,
            job.source,
            start.elapsed().as_millis()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_build_audio_args() {
        let args = FfmpegConverter::build_audio_args(
            Path::new("/site/song.mp3"),
            Path::new("/site/.mediacanon-1.ogg"),
            5,
        );

        assert!(has_pair(&args, "-i", "/site/song.mp3"));
        assert!(has_pair(&args, "-c:a", "libvorbis"));
        assert!(has_pair(&args, "-q:a", "5"));
        assert!(has_pair(&args, "-f", "ogg"));
        assert!(args.contains(&"-vn".to_string()));
        assert!(args.contains(&"-y".to_string()));
        assert_eq!(args.last().unwrap(), "/site/.mediacanon-1.ogg");
        // Audio jobs never encode video
        assert!(!args.contains(&"-c:v".to_string()));
    }

    #[test]
    fn test_build_video_args_with_audio() {
        let args = FfmpegConverter::build_video_args(
            Path::new("/site/clip.mp4"),
            Path::new("/site/.mediacanon-2.ogv"),
            7,
            4,
            true,
        );

        assert!(has_pair(&args, "-c:v", "libtheora"));
        assert!(has_pair(&args, "-q:v", "7"));
        assert!(has_pair(&args, "-c:a", "libvorbis"));
        assert!(has_pair(&args, "-q:a", "4"));
        assert!(has_pair(&args, "-map", "0:V:0"));
        assert!(has_pair(&args, "-map", "0:a:0"));
        assert!(!args.contains(&"-an".to_string()));
        assert_eq!(args.last().unwrap(), "/site/.mediacanon-2.ogv");
    }

    #[test]
    fn test_build_video_args_without_audio() {
        let args = FfmpegConverter::build_video_args(
            Path::new("/site/silent.webm"),
            Path::new("/site/.mediacanon-3.ogv"),
            7,
            5,
            false,
        );

        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
        assert!(!has_pair(&args, "-map", "0:a:0"));
    }

    #[test]
    fn test_image_spec_is_rejected() {
        let converter = FfmpegConverter::with_defaults();
        let job = ConversionJob {
            source: PathBuf::from("/a.jpg"),
            output: PathBuf::from("/a.png"),
            spec: ConversionSpec::Image,
        };
        assert!(matches!(
            converter.build_args(&job),
            Err(ConverterError::UnsupportedSpec { .. })
        ));
    }

    #[tokio::test]
    async fn test_convert_with_missing_ffmpeg() {
        let config = ToolsConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
            ..Default::default()
        };
        let converter = FfmpegConverter::new(&config);
        let job = ConversionJob {
            source: PathBuf::from("/a.mp3"),
            output: PathBuf::from("/a.ogg"),
            spec: ConversionSpec::Audio { quality: 5 },
        };
        let err = converter.convert(&job).await.unwrap_err();
        assert!(err.is_tool_missing());
    }
}
