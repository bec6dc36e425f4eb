//! ImageMagick-based raster converter.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionSpec};
use crate::config::ToolsConfig;
use crate::process::{limit_from_secs, run_tool, stderr_tail, ToolRunError};

/// Rasterizes images to PNG with ImageMagick.
///
/// Animated and multi-page inputs are reduced to their first frame.
pub struct MagickConverter {
    magick_path: PathBuf,
    timeout_secs: u64,
}

impl MagickConverter {
    /// Creates a converter using the configured `magick` binary.
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            magick_path: config.magick_path.clone(),
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
                tool: "magick".to_string(),
                path: self.magick_path.clone(),
            },
            ToolRunError::Timeout => ConverterError::Timeout {
                timeout_secs: self.timeout_secs,
            },
            ToolRunError::Io(e) => ConverterError::Io(e),
        }
    }

    /// Builds magick arguments for a first-frame PNG conversion.
    fn build_args(input_path: &Path, output_path: &Path) -> Vec<String> {
        vec![
            // Frame selector: only the first frame/page is read
            format!("{}[0]", input_path.to_string_lossy()),
            // Keep repeat conversions byte-identical
            "+set".to_string(),
            "date:create".to_string(),
            "+set".to_string(),
            "date:modify".to_string(),
            "-define".to_string(),
            "png:exclude-chunks=date,time".to_string(),
            format!("png:{}", output_path.to_string_lossy()),
        ]
    }
}

#[async_trait]
impl Converter for MagickConverter {
    fn name(&self) -> &str {
        "magick"
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        run_tool(&self.magick_path, ["-version"], limit_from_secs(self.timeout_secs))
            .await
            .map(|_| ())
            .map_err(|e| self.map_run_error(e))
    }

    async fn convert(&self, job: &ConversionJob) -> Result<(), ConverterError> {
        if job.spec != ConversionSpec::Image {
            return Err(ConverterError::UnsupportedSpec {
                converter: self.name().to_string(),
                spec: job.spec.to_string(),
            });
        }

        let args = Self::build_args(&job.source, &job.output);
        let output = run_tool(&self.magick_path, &args, limit_from_secs(self.timeout_secs))
            .await
            .map_err(|e| self.map_run_error(e))?;

        if !output.status.success() {
            return Err(ConverterError::conversion_failed(
                format!("magick exited with code: {:?}", output.status.code()),
                stderr_tail(&output.stderr, 5),
            ));
        }

        let meta = tokio::fs::metadata(&job.output)
            .await
            .map_err(|_| ConverterError::conversion_failed("Output file not created", None))?;
        if meta.len() == 0 {
            return Err(ConverterError::conversion_failed("Output file is empty", None));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_selects_first_frame() {
        let args = MagickConverter::build_args(
            Path::new("/site/img/anim.gif"),
            Path::new("/site/img/.mediacanon-9.png"),
        );
        assert_eq!(args.first().unwrap(), "/site/img/anim.gif[0]");
        assert_eq!(args.last().unwrap(), "png:/site/img/.mediacanon-9.png");
        assert!(args.contains(&"png:exclude-chunks=date,time".to_string()));
    }

    #[tokio::test]
    async fn test_rejects_audio_jobs() {
        let converter = MagickConverter::with_defaults();
        let job = ConversionJob {
            source: PathBuf::from("/a.mp3"),
            output: PathBuf::from("/a.ogg"),
            spec: ConversionSpec::Audio { quality: 5 },
        };
        assert!(matches!(
            converter.convert(&job).await,
            Err(ConverterError::UnsupportedSpec { .. })
        ));
    }

    #[tokio::test]
    async fn test_validate_missing_magick() {
        let config = ToolsConfig {
            magick_path: PathBuf::from("/nonexistent/magick"),
            ..Default::default()
        };
        let converter = MagickConverter::new(&config);
        assert!(converter.validate().await.unwrap_err().is_tool_missing());
    }
}
