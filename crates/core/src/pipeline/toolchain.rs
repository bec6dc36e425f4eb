//! The set of external tools a run delegates to.

use std::sync::Arc;

use crate::config::ToolsConfig;
use crate::converter::{Converter, FfmpegConverter, MagickConverter};
use crate::formats::MediaKind;
use crate::probe::{FfprobeProber, MediaProber};

/// Prober plus one converter for images and one for audio/video.
#[derive(Clone)]
pub struct Toolchain {
    pub prober: Arc<dyn MediaProber>,
    pub image: Arc<dyn Converter>,
    pub media: Arc<dyn Converter>,
}

impl Toolchain {
    pub fn new(
        prober: impl MediaProber + 'static,
        image: impl Converter + 'static,
        media: impl Converter + 'static,
    ) -> Self {
        Self {
            prober: Arc::new(prober),
            image: Arc::new(image),
            media: Arc::new(media),
        }
    }

    /// ffprobe, ImageMagick and ffmpeg as configured.
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(
            FfprobeProber::new(config),
            MagickConverter::new(config),
            FfmpegConverter::new(config),
        )
    }

    /// Converter responsible for `kind`.
    pub fn converter_for(&self, kind: MediaKind) -> &dyn Converter {
        match kind {
            MediaKind::Image => self.image.as_ref(),
            _ => self.media.as_ref(),
        }
    }
}
