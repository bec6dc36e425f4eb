//! Canonicality checks and plan construction.

use tracing::debug;

use super::types::PlanEntry;
use crate::classifier::{Classified, MediaFile};
use crate::formats::{
    audio_is_canonical, conversion_target, image_is_canonical, video_is_canonical, MediaKind,
};
use crate::probe::{MediaProber, ProbeError};

/// Decides canonicality and derives conversion targets.
pub struct Planner<'a> {
    prober: &'a dyn MediaProber,
}

impl<'a> Planner<'a> {
    pub fn new(prober: &'a dyn MediaProber) -> Self {
        Self { prober }
    }

    /// Plans an image. `None` when it already has the canonical extension.
    pub fn plan_image(&self, file: &MediaFile) -> Option<PlanEntry> {
        if image_is_canonical(&file.extension) {
            return None;
        }
        let target = conversion_target(&file.path, MediaKind::Image)?;
        Some(PlanEntry {
            source: file.path.clone(),
            target,
            kind: MediaKind::Image,
            streams: Default::default(),
        })
    }

    /// Plans a classified audio/video file, probing its codecs.
    ///
    /// `None` when the file is already canonical or could not be classified.
    pub async fn plan_media(&self, classified: Classified) -> Result<Option<PlanEntry>, ProbeError> {
        let Classified { file, mut streams } = classified;

        if streams.has_video {
            streams.video_codec = self.prober.video_codec(&file.path).await?;
        }
        if streams.has_audio {
            streams.audio_codec = self.prober.audio_codec(&file.path).await?;
        }

        let canonical = match file.kind {
            MediaKind::Audio => audio_is_canonical(&file.extension, &streams),
            MediaKind::Video => video_is_canonical(&file.extension, &streams),
            MediaKind::Image | MediaKind::Unclassified => return Ok(None),
        };
        if canonical {
            debug!("{:?} is already canonical {}", file.path, file.kind);
            return Ok(None);
        }

        let Some(target) = conversion_target(&file.path, file.kind) else {
            return Ok(None);
        };
        Ok(Some(PlanEntry {
            source: file.path,
            target,
            kind: file.kind,
            streams,
        }))
    }
}
